use std::path::PathBuf;

use anyhow::Result;
use clap::{value_parser, Arg, ArgAction, Command};
use rewrite_cli::{load_config, parse_option, registry, run};
use rewrite_core::init_tracing;

fn main() -> Result<()> {
    init_tracing();

    let matches = Command::new("rewrite")
        .version(rewrite_core::VERSION)
        .about("Run source-to-source rewrite recipes over a project")
        .arg(
            Arg::new("dir")
                .long("dir")
                .value_name("DIR")
                .help("Project root")
                .default_value(".")
                .value_parser(value_parser!(PathBuf)),
        )
        .arg(
            Arg::new("recipe")
                .long("recipe")
                .value_name("NAME")
                .help("Registered recipe to run"),
        )
        .arg(
            Arg::new("option")
                .long("option")
                .short('o')
                .value_name("KEY=VALUE")
                .help("Recipe option, may be repeated")
                .action(ArgAction::Append),
        )
        .arg(
            Arg::new("config")
                .long("config")
                .value_name("FILE")
                .help("JSON configuration file (defaults to rewrite.json in the project root)")
                .value_parser(value_parser!(PathBuf)),
        )
        .arg(
            Arg::new("max-cycles")
                .long("max-cycles")
                .value_name("N")
                .help("Maximum number of passes")
                .value_parser(value_parser!(usize)),
        )
        .arg(
            Arg::new("dry-run")
                .long("dry-run")
                .help("Print diffs instead of writing files")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("list")
                .long("list")
                .help("List available recipes")
                .action(ArgAction::SetTrue),
        )
        .get_matches();

    if matches.get_flag("list") {
        let registry = registry();
        let mut recipes: Vec<(&str, &str)> = registry.list().collect();
        recipes.sort();
        for (name, description) in recipes {
            println!("{name:<36} {description}");
        }
        return Ok(());
    }

    let dir = matches
        .get_one::<PathBuf>("dir")
        .cloned()
        .unwrap_or_else(|| PathBuf::from("."));
    let mut config = load_config(&dir, matches.get_one::<PathBuf>("config").map(PathBuf::as_path))?;

    // Flags override the configuration file
    if let Some(recipe) = matches.get_one::<String>("recipe") {
        config.recipe = Some(recipe.clone());
    }
    for option in matches.get_many::<String>("option").unwrap_or_default() {
        let (key, value) = parse_option(option)?;
        config.options.insert(key, value);
    }
    if let Some(max_cycles) = matches.get_one::<usize>("max-cycles") {
        config.max_cycles = *max_cycles;
    }
    if matches.get_flag("dry-run") {
        config.dry_run = true;
    }

    let summary = run(&dir, &config)?;
    if config.dry_run {
        for diff in &summary.diffs {
            print!("{diff}");
        }
    }
    println!(
        "{} changed, {} added, {} deleted{}",
        summary.changed,
        summary.generated,
        summary.deleted,
        if summary.skipped > 0 {
            format!(", {} remote file(s) to fetch", summary.skipped)
        } else {
            String::new()
        }
    );
    Ok(())
}
