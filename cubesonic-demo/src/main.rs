mod cli;

use cli::DemoOptions;

const USAGE: &str = "Usage: cubesonic-demo [--headless] [--frames N] [--tap-every N] [--asset PATH]";

fn parse_args(args: &[String]) -> anyhow::Result<DemoOptions> {
    let mut options = DemoOptions::default();
    let mut iter = args.iter().skip(1);

    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--headless" => options.headless = true,
            "--frames" => options.frames = next_value(&mut iter, arg)?.parse()?,
            "--tap-every" => options.tap_every = next_value(&mut iter, arg)?.parse()?,
            "--asset" => options.asset = Some(next_value(&mut iter, arg)?.to_string()),
            "--help" | "-h" => {
                println!("{}", USAGE);
                std::process::exit(0);
            }
            other => anyhow::bail!("Unknown argument {}\n{}", other, USAGE),
        }
    }

    Ok(options)
}

fn next_value<'a>(
    iter: &mut impl Iterator<Item = &'a String>,
    flag: &str,
) -> anyhow::Result<&'a String> {
    iter.next()
        .ok_or_else(|| anyhow::anyhow!("{} needs a value\n{}", flag, USAGE))
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .init();

    let args: Vec<String> = std::env::args().collect();
    let options = parse_args(&args)?;

    if options.headless || options.asset.is_none() {
        cli::run_headless(&options)
    } else {
        cli::run_device(&options)
    }
}
