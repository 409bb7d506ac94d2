//! Command-line frontend for cascade schemes.
//!
//! Loads a TOML scheme, builds the registry, and answers questions about it.

use cascade_core::{NodeId, Registry, Scheme, SettingKey};
use cascade_search::{SearchConfig, SearchEngine, SearchQuery};
use std::path::Path;
use std::process::ExitCode;
use std::sync::Arc;

const USAGE: &str = "\
Usage: cascade_cli <command> [args]

Commands:
  check <scheme.toml>                 validate a scheme and report problems
  tree <scheme.toml>                  print the forest with resolved settings
  resolve <scheme.toml> <node> <key>  resolve one setting
  truthy <scheme.toml> <node> <key>   print the truthiness of one setting
  find <scheme.toml> <query>          fuzzy-search declared setting keys
  export <scheme.toml> <out.json>     write a JSON snapshot
";

type CliResult = Result<(), Box<dyn std::error::Error>>;

fn main() -> ExitCode {
    let args: Vec<String> = std::env::args().skip(1).collect();

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: &[String]) -> CliResult {
    let command = args.first().map(String::as_str);

    match (command, &args[1..]) {
        (Some("check"), [scheme]) => check(Path::new(scheme)),
        (Some("tree"), [scheme]) => tree(Path::new(scheme)),
        (Some("resolve"), [scheme, node, key]) => resolve(Path::new(scheme), node, key),
        (Some("truthy"), [scheme, node, key]) => truthy(Path::new(scheme), node, key),
        (Some("find"), [scheme, query]) => find(Path::new(scheme), query),
        (Some("export"), [scheme, out]) => export(Path::new(scheme), Path::new(out)),
        _ => {
            eprint!("{USAGE}");
            Err("invalid arguments".into())
        }
    }
}

fn load_registry(path: &Path) -> Result<Registry, Box<dyn std::error::Error>> {
    let scheme = Scheme::load(path)?;
    let problems = scheme.validate();
    if !problems.is_empty() {
        return Err(format!("invalid scheme: {}", problems.join("; ")).into());
    }
    Ok(scheme.build()?)
}

fn check(path: &Path) -> CliResult {
    let scheme = Scheme::load(path)?;
    let problems = scheme.validate();

    if problems.is_empty() {
        scheme.build()?;
        println!("ok: {} nodes", scheme.nodes.len());
        return Ok(());
    }

    for problem in &problems {
        eprintln!("{problem}");
    }
    Err(format!("{} problem(s)", problems.len()).into())
}

fn tree(path: &Path) -> CliResult {
    let registry = load_registry(path)?;

    for root in registry.roots() {
        print_subtree(&registry, root, 0);
    }
    Ok(())
}

fn print_subtree(registry: &Registry, node: NodeId, depth: usize) {
    let indent = "  ".repeat(depth);
    println!("{indent}{}", registry.name(node));

    for key in registry.declared_keys(node) {
        // declared_keys only returns resolvable keys, so get cannot fail.
        let resolved = registry.get(node, &key).ok().flatten();
        match resolved {
            None => println!("{indent}  {key} = <unset>"),
            Some(value) => {
                let source = registry.source_of(node, &key).ok().flatten();
                match source {
                    Some(id) if id != node => {
                        println!("{indent}  {key} = {value} (from {})", registry.name(id))
                    }
                    _ => println!("{indent}  {key} = {value}"),
                }
            }
        }
    }

    for child in registry.children(node) {
        print_subtree(registry, *child, depth + 1);
    }
}

fn resolve(path: &Path, node: &str, key: &str) -> CliResult {
    let registry = load_registry(path)?;
    let node = registry.node_id(node)?;
    let key = SettingKey::try_from(key)?;

    match registry.get(node, &key)? {
        None => println!("<unset>"),
        Some(value) => println!("{value}"),
    }
    Ok(())
}

fn truthy(path: &Path, node: &str, key: &str) -> CliResult {
    let registry = load_registry(path)?;
    let node = registry.node_id(node)?;
    let key = SettingKey::try_from(key)?;

    println!("{}", registry.truthy(node, &key)?);
    Ok(())
}

fn find(path: &Path, query: &str) -> CliResult {
    let registry = load_registry(path)?;

    let mut exposed = Vec::new();
    let mut restricted = Vec::new();
    for id in registry.node_ids() {
        for (key, options) in registry.own_declarations(id) {
            if options.instance_reader {
                exposed.push(key.clone());
            } else {
                restricted.push(key.clone());
            }
        }
    }

    let mut engine = SearchEngine::new(exposed, restricted, SearchConfig::default(), Arc::new(|| {}));
    engine.set_query(SearchQuery::Fuzzy(query.to_string()));
    while !engine.is_done() {
        engine.tick();
    }

    for key in engine.exposed_results().iter() {
        println!("{key}");
    }

    let node_only: Vec<String> = engine
        .restricted_results()
        .iter()
        .map(|key| key.to_string())
        .collect();
    if !node_only.is_empty() {
        println!("node-only:");
        for key in node_only {
            println!("  {key}");
        }
    }
    Ok(())
}

fn export(path: &Path, out: &Path) -> CliResult {
    let registry = load_registry(path)?;
    registry.snapshot().save(out)?;
    println!("wrote {}", out.display());
    Ok(())
}
