use super::print::{
    print_config, print_full_items, print_items, print_messages, print_pagination,
    print_receipts, print_stats, print_subjects,
};
use super::setup::{
    command_name, print_grouped_help, print_help_for_command, Cli, Commands, CoreCommands,
    DataCommands, ItemCommands, MiscCommands, SubjectCommands,
};
use clap::Parser;
use recall::api::{
    CmdResult, ConfigAction, ItemFilter, ItemStatusFilter, ItemUpdate, MessageLevel, NewItem,
    Page, RecallApi, SubjectAction,
};
use recall::editor::{edit_content, EditorContent};
use recall::error::{RecallError, Result};
use recall::init::initialize;
use recall::model::OwnerId;
use recall::store::fs::FileStore;
use std::io::{IsTerminal, Read};
use std::path::PathBuf;

struct AppContext {
    api: RecallApi<FileStore>,
    owner: OwnerId,
}

pub fn run() -> Result<()> {
    let cli = Cli::parse();

    if cli.help {
        match &cli.command {
            None => print_grouped_help(),
            Some(command) => print_help_for_command(command_name(command)),
        }
        return Ok(());
    }

    init_logging(cli.verbose);

    if let Some(Commands::Misc(MiscCommands::Help { command })) = &cli.command {
        return handle_help(command.clone());
    }

    let recall = initialize(cli.user.as_deref())?;
    let mut ctx = AppContext {
        api: recall.api,
        owner: recall.owner,
    };

    match cli.command {
        Some(Commands::Core(cmd)) => match cmd {
            CoreCommands::Add {
                content,
                subject,
                tags,
                no_editor,
                check,
                title,
            } => {
                if check {
                    handle_check(&mut ctx, content)
                } else {
                    handle_add(&mut ctx, title, content, subject, tags, no_editor)
                }
            }
            CoreCommands::List {
                search,
                subject,
                tags,
                archived,
                all,
                page,
                limit,
            } => {
                let status = if all {
                    ItemStatusFilter::All
                } else if archived {
                    ItemStatusFilter::Archived
                } else {
                    ItemStatusFilter::Active
                };
                let filter = ItemFilter {
                    status,
                    subject,
                    tags,
                    search_term: search,
                };
                let page = page.map(|page| Page { page, limit });
                handle_list(&mut ctx, filter, page)
            }
            CoreCommands::Due { overdue } => handle_due(&mut ctx, overdue),
            CoreCommands::Review { outcome, items } => {
                let mut result =
                    ctx.api
                        .review_items(&ctx.owner, &items, outcome.map(Into::into))?;
                print_receipts(&result.receipts);
                // Receipts replace the per-item success lines.
                result
                    .messages
                    .retain(|m| m.level != MessageLevel::Success);
                finish(&result)
            }
        },
        Some(Commands::Item(cmd)) => match cmd {
            ItemCommands::View { items } => {
                let result = ctx.api.view_items(&ctx.owner, &items)?;
                print_full_items(&result.listed_items);
                finish(&result)
            }
            ItemCommands::Edit { items } => handle_edit(&mut ctx, items),
            ItemCommands::Archive { items } => {
                let result = ctx.api.archive_items(&ctx.owner, &items)?;
                finish(&result)
            }
            ItemCommands::Unarchive { items } => {
                let result = ctx.api.unarchive_items(&ctx.owner, &items)?;
                finish(&result)
            }
            ItemCommands::Delete { items } => {
                let result = ctx.api.delete_items(&ctx.owner, &items)?;
                finish(&result)
            }
        },
        Some(Commands::Data(cmd)) => match cmd {
            DataCommands::Stats => {
                let result = ctx.api.stats(&ctx.owner)?;
                if let Some(stats) = &result.stats {
                    print_stats(stats);
                }
                finish(&result)
            }
            DataCommands::Subjects { action } => {
                let action = match action {
                    None => SubjectAction::List,
                    Some(SubjectCommands::Add { color, name }) => SubjectAction::Add {
                        name: name.join(" "),
                        color,
                    },
                };
                let result = ctx.api.subjects(&ctx.owner, action)?;
                print_subjects(&result.subjects);
                finish(&result)
            }
            DataCommands::Export { out_dir, items } => {
                let result = ctx
                    .api
                    .export_items(&ctx.owner, &items, &PathBuf::from(out_dir))?;
                finish(&result)
            }
        },
        Some(Commands::Misc(cmd)) => match cmd {
            MiscCommands::Config { key, value } => handle_config(&mut ctx, key, value),
            MiscCommands::Init => {
                let result = ctx.api.init()?;
                finish(&result)
            }
            MiscCommands::Help { command } => handle_help(command),
        },
        None => handle_due(&mut ctx, true),
    }
}

/// `RUST_LOG` wins; otherwise warnings, or debug with `--verbose`.
fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .format_timestamp(None)
        .try_init();
}

/// Prints the messages and turns error-level messages into a failing exit.
fn finish(result: &CmdResult) -> Result<()> {
    print_messages(&result.messages);
    if result.has_errors() {
        return Err(RecallError::Api("command reported errors".to_string()));
    }
    Ok(())
}

fn read_piped_stdin() -> Option<String> {
    if std::io::stdin().is_terminal() {
        return None;
    }
    let mut buffer = String::new();
    match std::io::stdin().read_to_string(&mut buffer) {
        Ok(_) if !buffer.trim().is_empty() => Some(buffer),
        _ => None,
    }
}

fn handle_add(
    ctx: &mut AppContext,
    title: Vec<String>,
    content: Option<String>,
    subject: Option<String>,
    tags: Vec<String>,
    no_editor: bool,
) -> Result<()> {
    let mut title = title.join(" ");
    let content = match content.or_else(read_piped_stdin) {
        Some(content) => content,
        None if no_editor => String::new(),
        None => {
            let edited = edit_content(
                &EditorContent::new(title.clone(), String::new()),
                ctx.api.file_ext(),
            )?;
            if edited.is_empty() {
                println!("Nothing to add.");
                return Ok(());
            }
            title = edited.title;
            edited.content
        }
    };

    let new_item = NewItem {
        title,
        content,
        subject,
        tags,
    };
    let result = ctx.api.create_item(&ctx.owner, new_item)?;
    finish(&result)
}

fn handle_check(ctx: &mut AppContext, content: Option<String>) -> Result<()> {
    let content = content.or_else(read_piped_stdin).ok_or_else(|| {
        RecallError::BadRequest("--check needs content via --content or stdin".to_string())
    })?;
    let result = ctx.api.check_duplicates(&ctx.owner, &content)?;
    if !result.listed_items.is_empty() {
        print_items(&result.listed_items, "");
    }
    finish(&result)
}

fn handle_list(ctx: &mut AppContext, filter: ItemFilter, page: Option<Page>) -> Result<()> {
    let empty_message = if filter.search_term.is_some() {
        "No matching items."
    } else {
        "No items found."
    };
    let result = ctx.api.get_items(&ctx.owner, filter, page)?;
    print_items(&result.listed_items, empty_message);
    if let Some(pagination) = &result.pagination {
        print_pagination(pagination);
    }
    finish(&result)
}

fn handle_due(ctx: &mut AppContext, include_overdue: bool) -> Result<()> {
    let result = ctx.api.due_items(&ctx.owner, include_overdue)?;
    print_items(&result.listed_items, "Nothing due. Come back tomorrow.");
    finish(&result)
}

fn handle_edit(ctx: &mut AppContext, items: Vec<String>) -> Result<()> {
    let result = ctx.api.view_items(&ctx.owner, &items)?;
    let mut updates = Vec::new();

    for di in &result.listed_items {
        let meta = &di.item.metadata;
        let initial = EditorContent::new(meta.title.clone(), di.item.content.clone());
        let edited = edit_content(&initial, ctx.api.file_ext())?;
        if edited != initial {
            updates.push(ItemUpdate::new(meta.id, edited.title, edited.content));
        }
    }

    if updates.is_empty() {
        println!("No changes.");
        return Ok(());
    }
    let result = ctx.api.update_items(&ctx.owner, &updates)?;
    finish(&result)
}

fn handle_config(ctx: &mut AppContext, key: Option<String>, value: Option<String>) -> Result<()> {
    let action = match (key, value) {
        (None, _) => ConfigAction::ShowAll,
        (Some(k), None) => ConfigAction::ShowKey(k),
        (Some(k), Some(v)) => ConfigAction::Set(k, v),
    };
    let show_all = matches!(action, ConfigAction::ShowAll);

    let result = ctx.api.config(&ctx.owner, action)?;
    if show_all {
        if let Some(config) = &result.config {
            print_config(config, result.profile.as_ref());
        }
    }
    finish(&result)
}

fn handle_help(command: Option<String>) -> Result<()> {
    match command {
        Some(cmd) => print_help_for_command(&cmd),
        None => print_grouped_help(),
    }
    Ok(())
}
