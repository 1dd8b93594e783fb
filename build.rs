// build.rs

use clap::{Arg, ArgAction, Command};
use clap_mangen::Man;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

fn build_cli() -> Command {
    Command::new("jpm")
        .version(env!("CARGO_PKG_VERSION"))
        .author("jpm Contributors")
        .about("Search, resolve and install Jenkins plugins")
        .subcommand_required(false)
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .global(true)
                .action(ArgAction::SetTrue)
                .help("Enable verbose output"),
        )
        .arg(
            Arg::new("offline")
                .long("offline")
                .global(true)
                .action(ArgAction::SetTrue)
                .help("Use jpm in a fully offline mode"),
        )
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .global(true)
                .value_name("PATH")
                .help("Path to a config file"),
        )
        .subcommand(
            Command::new("search")
                .about("Search for available plugins")
                .arg(Arg::new("term").required(true).help("Regular expression matched against plugin names")),
        )
        .subcommand(
            Command::new("update")
                .about("Update the local plugin repository meta-data")
                .arg(Arg::new("source").long("source").help("Use a different update-center URL"))
                .arg(
                    Arg::new("force")
                        .short('f')
                        .long("force")
                        .action(ArgAction::SetTrue)
                        .help("Forcefully overwrite any existing repository"),
                ),
        )
        .subcommand(
            Command::new("install")
                .about("Install the named plugins and their dependencies")
                .arg(Arg::new("names").required(true).num_args(1..).help("Plugin names"))
                .arg(
                    Arg::new("dry_run")
                        .long("dry-run")
                        .action(ArgAction::SetTrue)
                        .help("Show what would be installed without downloading anything"),
                )
                .arg(
                    Arg::new("no_optional")
                        .long("no-optional")
                        .action(ArgAction::SetTrue)
                        .help("Do not install optional dependencies"),
                )
                .arg(
                    Arg::new("parallel")
                        .long("parallel")
                        .action(ArgAction::SetTrue)
                        .help("Download plugins concurrently"),
                ),
        )
        .subcommand(
            Command::new("list")
                .about("List the installed plugins, optionally filtered by TERM")
                .arg(Arg::new("term").help("Regular expression matched against installed plugin names")),
        )
        .subcommand(
            Command::new("completions")
                .about("Generate shell completion scripts")
                .arg(
                    Arg::new("shell")
                        .required(true)
                        .value_parser(["bash", "elvish", "fish", "powershell", "zsh"])
                        .help("Shell type"),
                ),
        )
}

/// Render one man page into `man_dir`, warning instead of failing the build
fn render_page(cmd: Command, title: &str, man_dir: &Path) {
    let file_name = format!("{title}.1");
    let mut buffer = Vec::new();
    if let Err(e) = Man::new(cmd).title(title).render(&mut buffer) {
        println!("cargo:warning=Failed to render {}: {}", file_name, e);
        return;
    }
    if let Err(e) = fs::write(man_dir.join(&file_name), buffer) {
        println!("cargo:warning=Failed to write {}: {}", file_name, e);
    }
}

fn main() {
    println!("cargo:rerun-if-changed=build.rs");

    let Some(manifest_dir) = env::var_os("CARGO_MANIFEST_DIR").map(PathBuf::from) else {
        println!("cargo:warning=CARGO_MANIFEST_DIR not set, skipping man pages");
        return;
    };
    let man_dir = manifest_dir.join("man");
    if let Err(e) = fs::create_dir_all(&man_dir) {
        println!("cargo:warning=Failed to create {}: {}", man_dir.display(), e);
        return;
    }

    let cli = build_cli();

    // jpm.1 plus one jpm-<command>.1 page per subcommand
    for sub in cli.get_subcommands() {
        render_page(sub.clone(), &format!("jpm-{}", sub.get_name()), &man_dir);
    }
    render_page(cli, "jpm", &man_dir);
}
