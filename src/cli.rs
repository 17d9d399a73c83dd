use crate::{DraftSink, FieldPointer, Options, RecipeDraft, SessionOutcome, StreamSession};
use async_trait::async_trait;
use bytes::Bytes;
use std::convert::Infallible;
use std::env;
use std::fs;
use std::io::{self, Read};

fn print_help(program: &str) {
    eprintln!(
        "Usage: {prog} [OPTIONS] [INPUT]\n\
         \n\
         Replays a generator transcript through a streaming ingestion session\n\
         and prints every accepted draft snapshot plus the active-field id.\n\
         \n\
         INPUT: optional transcript file. When omitted, reads from stdin.\n\
         \n\
         Options:\n\
           --chunk-size BYTES   Feed the transcript in chunks of BYTES (default 16)\n\
           --no-fence           Disable Markdown code fence stripping\n\
           --keep-commas        Disable dangling-comma removal before balancing\n\
           --repair-final       Repair the full text when the final exact parse fails\n\
           -q, --quiet          Only print the terminal outcome\n\
           -h, --help           Show this help\n",
        prog = program
    );
}

struct CliMode {
    input: Option<String>,
    chunk_size: usize,
    quiet: bool,
}

fn parse_args() -> (Options, CliMode) {
    let mut args: Vec<String> = env::args().collect();
    let program = args
        .first()
        .cloned()
        .unwrap_or_else(|| "recipestream-cli".to_string());
    args.remove(0);

    let mut opts = Options::default();
    let mut mode = CliMode {
        input: None,
        chunk_size: 16,
        quiet: false,
    };

    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "-h" | "--help" => {
                print_help(&program);
                std::process::exit(0);
            }
            "--chunk-size" => {
                i += 1;
                if i >= args.len() {
                    eprintln!("Missing BYTES for --chunk-size");
                    std::process::exit(2);
                }
                mode.chunk_size = args[i].parse().unwrap_or(16).max(1);
            }
            "--no-fence" => {
                opts.strip_code_fences = false;
            }
            "--keep-commas" => {
                opts.strip_dangling_commas = false;
            }
            "--repair-final" => {
                opts.repair_final = true;
            }
            "-q" | "--quiet" => {
                mode.quiet = true;
            }
            other => {
                if other.starts_with('-') {
                    eprintln!("Unknown option: {}", other);
                    std::process::exit(2);
                }
                mode.input = Some(other.to_string());
            }
        }
        i += 1;
    }
    (opts, mode)
}

struct PrintSink {
    quiet: bool,
}

#[async_trait]
impl DraftSink for PrintSink {
    async fn set_draft(&mut self, draft: RecipeDraft) {
        if !self.quiet {
            let json = serde_json::to_string(&draft).unwrap_or_default();
            println!("draft {}", json);
        }
    }

    async fn set_active_field(&mut self, field: Option<FieldPointer>) {
        if !self.quiet {
            match field {
                Some(pointer) => println!("active-field {}", pointer),
                None => println!("active-field none"),
            }
        }
    }
}

pub fn run() -> i32 {
    env_logger::init();
    let (opts, mode) = parse_args();

    let content: Vec<u8> = match &mode.input {
        Some(path) => match fs::read(path) {
            Ok(bytes) => bytes,
            Err(e) => {
                eprintln!("Cannot read {}: {}", path, e);
                return 2;
            }
        },
        None => {
            let mut buf = Vec::new();
            if let Err(e) = io::stdin().read_to_end(&mut buf) {
                eprintln!("Cannot read stdin: {}", e);
                return 2;
            }
            buf
        }
    };

    let chunks: Vec<Result<Bytes, Infallible>> = content
        .chunks(mode.chunk_size)
        .map(|c| Ok(Bytes::copy_from_slice(c)))
        .collect();

    let rt = match tokio::runtime::Builder::new_current_thread().build() {
        Ok(rt) => rt,
        Err(e) => {
            eprintln!("Cannot start runtime: {}", e);
            return 2;
        }
    };

    let session = StreamSession::new(PrintSink { quiet: mode.quiet }, opts);
    let outcome = rt.block_on(session.run(futures::stream::iter(chunks)));
    match outcome {
        SessionOutcome::Completed(draft) => {
            let json = serde_json::to_string(&draft).unwrap_or_default();
            println!("completed {}", json);
            0
        }
        SessionOutcome::Failed(reason) => {
            eprintln!("error: {}", reason);
            1
        }
        SessionOutcome::Cancelled => {
            eprintln!("cancelled");
            1
        }
    }
}
