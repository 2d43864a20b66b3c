use confex::cli;
use confex::Program;
use tracing_subscriber::EnvFilter;

fn main() {
    let args = match cli::parse_args() {
        Ok(a) => a,
        Err(e) => {
            eprintln!("confex: {e}");
            eprintln!("{}", cli::USAGE);
            std::process::exit(1);
        }
    };

    // ── Logging ───────────────────────────────────────────────────────────────
    // RUST_LOG wins; otherwise -v selects debug output.
    let default_level = if args.verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let script = cli::load_script(&args.script).unwrap_or_else(|e| fail(&e));
    let ctx = cli::load_context(args.context.as_deref()).unwrap_or_else(|e| fail(&e));

    let result = Program::compile(&script, &args.options)
        .and_then(|program| program.run(&ctx, &args.options));
    match result {
        Ok(value) => println!("{value}"),
        Err(e) => fail(&e.to_string()),
    }
}

fn fail(msg: &str) -> ! {
    eprintln!("confex: {msg}");
    std::process::exit(1);
}
