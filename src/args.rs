use clap::{Arg, ArgAction, Command};

#[derive(Debug)]
pub struct ParsedArgs {
    pub filename: String,
    pub follow: bool,
    pub config: Option<String>,
}

pub fn parse_args(args: Vec<String>) -> ParsedArgs {
    let matches = Command::new("tabwatch")
        .about("Table viewer for growing JSON-lines log files")
        .version(env!("CARGO_PKG_VERSION"))
        .arg(
            Arg::new("no-follow")
                .short('n')
                .long("no-follow")
                .action(ArgAction::SetTrue)
                .help("Do not jump to new records as they arrive"),
        )
        .arg(
            Arg::new("config")
                .long("config")
                .value_name("FILE")
                .help("Extra settings file, merged over the built in defaults"),
        )
        .arg(
            Arg::new("file")
                .required(true)
                .value_name("FILE")
                .help("JSON-lines file to watch"),
        )
        .try_get_matches_from(args);

    let matches = match matches {
        Ok(matches) => matches,
        // help and version land here as well, clap picks the exit code
        Err(e) => e.exit(),
    };

    ParsedArgs {
        filename: matches
            .get_one::<String>("file")
            .cloned()
            .unwrap_or_default(),
        follow: !matches.get_flag("no-follow"),
        config: matches.get_one::<String>("config").cloned(),
    }
}
