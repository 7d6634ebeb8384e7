use anyhow::Result;

fn main() -> Result<()> {
    let args = beancount_import_sui::args::parse();
    let default_filter = if args.debug { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .init();
    beancount_import_sui::cli::main(args)
}
