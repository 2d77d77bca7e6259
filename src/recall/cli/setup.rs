use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use recall::model::Outcome;

/// Returns the version string, including git hash and commit date for non-release builds.
/// Format: "0.3.2" for releases, "0.3.2@abc1234 2024-01-15 14:30" for dev builds
fn get_version() -> &'static str {
    const VERSION: &str = env!("CARGO_PKG_VERSION");
    const GIT_HASH: &str = env!("GIT_HASH");
    const GIT_COMMIT_DATE: &str = env!("GIT_COMMIT_DATE");
    const IS_RELEASE: &str = env!("IS_RELEASE");

    use std::sync::OnceLock;
    static VERSION_STRING: OnceLock<String> = OnceLock::new();

    VERSION_STRING.get_or_init(|| {
        if IS_RELEASE == "true" || GIT_HASH.is_empty() {
            VERSION.to_string()
        } else {
            format!("{}@{} {}", VERSION, GIT_HASH, GIT_COMMIT_DATE)
        }
    })
}

#[derive(Parser, Debug)]
#[command(
    name = "recall",
    bin_name = "recall",
    version = get_version(),
    disable_help_flag = true,
    disable_help_subcommand = true
)]
#[command(about = "Spaced-repetition study queue for the command line", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Act as this user (defaults to $RECALL_USER, config `user`, then $USER)
    #[arg(short, long, global = true, help_heading = "Options")]
    pub user: Option<String>,

    /// Verbose output
    #[arg(short, long, global = true, help_heading = "Options")]
    pub verbose: bool,

    /// Print help
    #[arg(short, long, global = true)]
    pub help: bool,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum OutcomeArg {
    Easy,
    #[value(alias = "medium")]
    Good,
    Hard,
}

impl From<OutcomeArg> for Outcome {
    fn from(arg: OutcomeArg) -> Self {
        match arg {
            OutcomeArg::Easy => Outcome::Easy,
            OutcomeArg::Good => Outcome::Good,
            OutcomeArg::Hard => Outcome::Hard,
        }
    }
}

/// Command group definitions for help output
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandGroup {
    Core,
    Item,
    Data,
    Misc,
}

impl CommandGroup {
    pub fn heading(&self) -> &'static str {
        match self {
            CommandGroup::Core => "Core Commands:",
            CommandGroup::Item => "Per-Item Commands:",
            CommandGroup::Data => "Data Commands:",
            CommandGroup::Misc => "Miscellaneous:",
        }
    }

    pub fn for_command(name: &str) -> Option<Self> {
        match name {
            "add" | "list" | "due" | "review" => Some(CommandGroup::Core),
            "view" | "edit" | "archive" | "unarchive" | "delete" => Some(CommandGroup::Item),
            "stats" | "subjects" | "export" => Some(CommandGroup::Data),
            "config" | "init" | "help" => Some(CommandGroup::Misc),
            _ => None,
        }
    }

    pub fn all() -> &'static [CommandGroup] {
        &[
            CommandGroup::Core,
            CommandGroup::Item,
            CommandGroup::Data,
            CommandGroup::Misc,
        ]
    }
}

/// Returns the custom grouped help output as a string
pub fn get_grouped_help() -> String {
    let cmd = Cli::command();
    let version = cmd.get_version().unwrap_or("unknown");

    let mut output = String::new();
    output.push_str(&format!("recall {version}\n"));
    output.push_str("Spaced-repetition study queue for the command line\n");
    output.push('\n');
    output.push_str("Usage: recall [OPTIONS] [COMMAND]\n");

    let subcommands: Vec<_> = cmd.get_subcommands().collect();

    for group in CommandGroup::all() {
        let group_cmds: Vec<_> = subcommands
            .iter()
            .filter(|sc| {
                !sc.is_hide_set() && CommandGroup::for_command(sc.get_name()) == Some(*group)
            })
            .collect();

        if !group_cmds.is_empty() {
            output.push('\n');
            output.push_str(&format!("{}\n", group.heading()));
            for sc in group_cmds {
                let name = sc.get_name();
                let about = sc.get_about().map(|s| s.to_string()).unwrap_or_default();
                output.push_str(&format!("  {:<12} {}\n", name, about));
            }
        }
    }

    output.push('\n');
    output.push_str("Options:\n");
    output.push_str("  -u, --user <USER>  Act as this user\n");
    output.push_str("  -v, --verbose      Verbose output\n");
    output.push_str("  -h, --help         Print help\n");
    output.push_str("  -V, --version      Print version\n");

    output
}

pub fn print_grouped_help() {
    print!("{}", get_grouped_help());
}

/// Prints help for a command by name, falling back to the grouped help.
pub fn print_help_for_command(name: &str) {
    let mut cmd = Cli::command();

    for subcmd in cmd.get_subcommands_mut() {
        if subcmd.get_name() == name || subcmd.get_all_aliases().any(|a| a == name) {
            let help = subcmd.render_help();
            print!("{}", help);
            return;
        }
    }

    eprintln!("Unknown command: {}", name);
    eprintln!();
    print_grouped_help();
}

/// Name of the parsed subcommand, for `recall <cmd> --help`.
pub fn command_name(command: &Commands) -> &'static str {
    match command {
        Commands::Core(c) => match c {
            CoreCommands::Add { .. } => "add",
            CoreCommands::List { .. } => "list",
            CoreCommands::Due { .. } => "due",
            CoreCommands::Review { .. } => "review",
        },
        Commands::Item(c) => match c {
            ItemCommands::View { .. } => "view",
            ItemCommands::Edit { .. } => "edit",
            ItemCommands::Archive { .. } => "archive",
            ItemCommands::Unarchive { .. } => "unarchive",
            ItemCommands::Delete { .. } => "delete",
        },
        Commands::Data(c) => match c {
            DataCommands::Stats => "stats",
            DataCommands::Subjects { .. } => "subjects",
            DataCommands::Export { .. } => "export",
        },
        Commands::Misc(c) => match c {
            MiscCommands::Config { .. } => "config",
            MiscCommands::Init => "init",
            MiscCommands::Help { .. } => "help",
        },
    }
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    #[command(flatten)]
    Core(CoreCommands),

    #[command(flatten)]
    Item(ItemCommands),

    #[command(flatten)]
    Data(DataCommands),

    #[command(flatten)]
    Misc(MiscCommands),
}

#[derive(Subcommand, Debug)]
pub enum CoreCommands {
    /// Add a study item
    #[command(alias = "n", display_order = 1)]
    Add {
        /// Item content (otherwise read from stdin or the editor)
        #[arg(short, long)]
        content: Option<String>,

        /// Subject id or name
        #[arg(short, long)]
        subject: Option<String>,

        /// Tag (repeatable)
        #[arg(short, long = "tag", value_name = "TAG")]
        tags: Vec<String>,

        /// Skip opening the editor
        #[arg(long)]
        no_editor: bool,

        /// Only report existing items with similar content, add nothing
        #[arg(long)]
        check: bool,

        /// Title words (joined with spaces, derived from content if omitted)
        #[arg(trailing_var_arg = true)]
        title: Vec<String>,
    },

    /// List items
    #[command(alias = "ls", display_order = 2)]
    List {
        /// Search title, content and tags
        #[arg(short = 'q', long)]
        search: Option<String>,

        /// Only items of this subject
        #[arg(short, long)]
        subject: Option<String>,

        /// Only items with any of these tags
        #[arg(short, long = "tag", value_name = "TAG")]
        tags: Vec<String>,

        /// Show archived items
        #[arg(long, conflicts_with = "all")]
        archived: bool,

        /// Show active and archived items
        #[arg(long)]
        all: bool,

        /// Page number (1-based), enables pagination
        #[arg(long)]
        page: Option<usize>,

        /// Items per page
        #[arg(long, default_value_t = 20)]
        limit: usize,
    },

    /// Show items due for review today
    #[command(alias = "today", display_order = 3)]
    Due {
        /// Include items whose review date has passed
        #[arg(long)]
        overdue: bool,
    },

    /// Record a review of one or more items
    #[command(alias = "r", display_order = 4)]
    Review {
        /// How well you remembered (default: good)
        #[arg(short, long, value_enum)]
        outcome: Option<OutcomeArg>,

        /// Indexes, ids or title of the items (e.g. 1 2-4 a1)
        #[arg(required = true, num_args = 1..)]
        items: Vec<String>,
    },
}

#[derive(Subcommand, Debug)]
pub enum ItemCommands {
    /// View one or more items
    #[command(alias = "v", display_order = 10)]
    View {
        /// Indexes, ids or title of the items (e.g. 1 a1)
        #[arg(required = true, num_args = 1..)]
        items: Vec<String>,
    },

    /// Edit items in the editor
    #[command(alias = "e", display_order = 11)]
    Edit {
        /// Indexes, ids or title of the items (e.g. 1 a1)
        #[arg(required = true, num_args = 1..)]
        items: Vec<String>,
    },

    /// Take items out of the review queue
    #[command(display_order = 12)]
    Archive {
        /// Indexes, ids or title of the items (e.g. 1 3 5)
        #[arg(required = true, num_args = 1..)]
        items: Vec<String>,
    },

    /// Put archived items back in the queue
    #[command(display_order = 13)]
    Unarchive {
        /// Indexes, ids or title of the items (e.g. a1 a2)
        #[arg(required = true, num_args = 1..)]
        items: Vec<String>,
    },

    /// Permanently delete items
    #[command(alias = "rm", display_order = 14)]
    Delete {
        /// Indexes, ids or title of the items (e.g. 1 3 5)
        #[arg(required = true, num_args = 1..)]
        items: Vec<String>,
    },
}

#[derive(Subcommand, Debug)]
pub enum DataCommands {
    /// Show study statistics
    #[command(display_order = 20)]
    Stats,

    /// List or add subjects
    #[command(display_order = 21)]
    Subjects {
        #[command(subcommand)]
        action: Option<SubjectCommands>,
    },

    /// Export items to a tar.gz backup
    #[command(display_order = 22)]
    Export {
        /// Directory to write the archive to
        #[arg(short, long, default_value = ".")]
        out_dir: String,

        /// Items to export (e.g. 1 2), all active items if omitted
        #[arg(required = false, num_args = 0..)]
        items: Vec<String>,
    },
}

#[derive(Subcommand, Debug)]
pub enum SubjectCommands {
    /// Add a subject
    Add {
        /// Display color, e.g. "#3366ff"
        #[arg(short, long)]
        color: String,

        /// Subject name
        #[arg(required = true, num_args = 1..)]
        name: Vec<String>,
    },
}

#[derive(Subcommand, Debug)]
pub enum MiscCommands {
    /// Get or set configuration
    #[command(display_order = 30)]
    Config {
        /// Configuration key (file-ext, policy, user, repetition-flow)
        key: Option<String>,

        /// Value to set (if omitted, prints current value)
        value: Option<String>,
    },

    /// Initialize the store
    #[command(display_order = 31)]
    Init,

    /// Print help for recall or a subcommand
    #[command(display_order = 32)]
    Help {
        /// Subcommand to get help for
        command: Option<String>,
    },
}
