use std::io::{self, IsTerminal};

use tabwatch::app::App;
use tabwatch::args;

fn main() {
    let parsed = args::parse_args(std::env::args().collect());

    if !io::stdout().is_terminal() {
        eprintln!("tabwatch: stdout is not a terminal");
        std::process::exit(1);
    }

    let mut app = match App::new(parsed) {
        Ok(app) => app,
        Err(err) => {
            eprintln!("tabwatch: {}", err);
            std::process::exit(1);
        }
    };

    let result = app.run();
    // terminal back to normal before any error output
    drop(app);

    if let Err(err) = result {
        eprintln!("tabwatch: {}", err);
        std::process::exit(1);
    }
}
