fn main() {
    std::process::exit(recipestream::cli::run());
}
