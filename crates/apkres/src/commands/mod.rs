pub mod arsc;

#[derive(clap::Subcommand)]
pub enum Commands {
    /// Handle compiled resource tables
    Arsc {
        #[command(subcommand)]
        command: arsc::ArscCommands,
    },
}

impl Commands {
    pub fn handle(&self) -> miette::Result<()> {
        match self {
            Commands::Arsc { command } => command.handle(),
        }
    }
}
