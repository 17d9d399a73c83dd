#[derive(Clone, Debug)]
pub struct Options {
    /// Strip a Markdown fence like ```json ... ``` around the document before
    /// any parse attempt. Generators often wrap their output in one even when
    /// told not to.
    pub strip_code_fences: bool,
    /// Remove list-separator commas left dangling by truncation (a comma
    /// immediately before a closing bracket/brace, or at the end of the
    /// buffer) before balancing delimiters.
    pub strip_dangling_commas: bool,
    /// When the authoritative end-of-stream parse fails, run one more repair
    /// pass over the complete text before falling back to the last streaming
    /// candidate. Off by default: the fallback candidate is already a repair
    /// of a near-complete prefix and is what the consumer last saw.
    pub repair_final: bool,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            strip_code_fences: true,
            strip_dangling_commas: true,
            repair_final: false,
        }
    }
}
