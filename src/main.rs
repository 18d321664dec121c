use clap::Parser;
use keyseal::cli::{commands, output, Cli, Commands};

fn main() {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Init => commands::init::execute(&cli),
        Commands::Add {
            ref id,
            ref username,
            ref email,
            generate,
            length,
            ref special,
        } => commands::add::execute(
            &cli,
            id,
            username.as_deref(),
            email.as_deref(),
            generate,
            length,
            special,
        ),
        Commands::Get { ref id, show, copy } => commands::get::execute(&cli, id, show, copy),
        Commands::List => commands::list::execute(&cli),
        Commands::Update {
            ref id,
            ref new_id,
            ref username,
            ref email,
        } => commands::update::execute(
            &cli,
            id,
            new_id.as_deref(),
            username.as_deref(),
            email.as_deref(),
        ),
        Commands::Delete { ref id, force } => commands::delete::execute(&cli, id, force),
        Commands::Rotate => commands::rotate::execute(&cli),
        Commands::Reset { force } => commands::reset::execute(&cli, force),
        Commands::Status => commands::status::execute(&cli),
        Commands::Generate { length, ref special } => {
            commands::generate::execute(length, special)
        }
    };

    if let Err(e) = result {
        output::error(&e.to_string());
        std::process::exit(1);
    }
}
