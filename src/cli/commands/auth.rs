use spendify_core::{AuthService, BudgetService, SyncService};

use crate::cli::core::{usage, CliMode, CommandError, CommandResult, ShellContext};
use crate::cli::format::{money, two_column};
use crate::cli::registry::CommandEntry;
use crate::cli::{io, output};

pub(crate) fn definitions() -> Vec<CommandEntry> {
    vec![
        CommandEntry::new(
            "signup",
            "Create an account",
            "signup <email> <password> <full name>",
            cmd_signup,
        ),
        CommandEntry::new(
            "login",
            "Sign in and sync any offline expenses",
            "login <email> [password]",
            cmd_login,
        ),
        CommandEntry::new("logout", "Sign out of this device", "logout", cmd_logout),
        CommandEntry::new("whoami", "Show the signed-in profile", "whoami", cmd_whoami),
        CommandEntry::new(
            "account",
            "Show or delete your account",
            "account <show|delete>",
            cmd_account,
        ),
    ]
}

fn cmd_signup(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let [email, password, name @ ..] = args else {
        return Err(usage("signup <email> <password> <full name>"));
    };
    if name.is_empty() {
        return Err(usage("signup <email> <password> <full name>"));
    }
    context.app.require_online("Creating an account")?;
    let full_name = name.join(" ");
    let user = AuthService::sign_up(
        context.app.backend(),
        context.app.clock(),
        email,
        password,
        &full_name,
    )?;
    io::print_success(format!("Account created for {}.", user.email));
    io::print_info("Use `login` to sign in.");
    Ok(())
}

fn cmd_login(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let (email, password) = match args {
        [email, password] => (email.to_string(), password.to_string()),
        [email] if context.mode() == CliMode::Interactive => {
            let password = io::prompt_password(&context.theme, "Password")?;
            (email.to_string(), password)
        }
        _ => return Err(usage("login <email> [password]")),
    };
    let (session, report) = context.app.login(&email, &password)?;
    io::print_success(format!("Signed in as {}.", session.email));
    if let Some(report) = report {
        context.report_sync(&report);
    }
    Ok(())
}

fn cmd_logout(context: &mut ShellContext, _args: &[&str]) -> CommandResult {
    let Some(session) = context.app.session()? else {
        io::print_info("No one is signed in.");
        return Ok(());
    };
    AuthService::sign_out(context.app.store())?;
    context.analytics = None;
    io::print_success(format!("Signed out {}.", session.email));
    Ok(())
}

fn cmd_whoami(context: &mut ShellContext, _args: &[&str]) -> CommandResult {
    show_profile(context)
}

fn cmd_account(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    match args.first().map(|action| action.to_lowercase()).as_deref() {
        None | Some("show") => show_profile(context),
        Some("delete") => delete_account(context),
        Some(other) => Err(CommandError::InvalidArguments(format!(
            "unknown account subcommand `{}`",
            other
        ))),
    }
}

fn show_profile(context: &ShellContext) -> CommandResult {
    let session = context.app.require_session()?;
    let pending = SyncService::pending(context.app.store())?.len();
    let network = if context.app.is_online() {
        "online"
    } else {
        "offline"
    };

    output::section("Profile");
    let mut rows = vec![("Email", session.email.clone())];
    if context.app.is_online() {
        let profile = AuthService::profile(context.app.backend(), &session)?;
        let budget = BudgetService::get(context.app.backend(), &session)?;
        rows.insert(0, ("Name", profile.name.clone()));
        rows.push(("Member since", profile.member_since()));
        rows.push(("Monthly budget", money(context.currency(), budget)));
    }
    rows.push(("Network", network.to_string()));
    rows.push(("Pending sync", pending.to_string()));
    for line in two_column(&rows) {
        output::line(line);
    }
    Ok(())
}

fn delete_account(context: &mut ShellContext) -> CommandResult {
    let session = context.app.require_session()?;
    context.app.require_online("Deleting your account")?;
    if !context.confirm(&format!(
        "Delete the account {} and all of its data?",
        session.email
    ))? {
        io::print_info("Account deletion cancelled.");
        return Ok(());
    }
    let removed =
        AuthService::delete_account(context.app.backend(), context.app.store(), &session)?;
    context.analytics = None;
    io::print_success(format!(
        "Account deleted ({} expenses, {} categories, {} lend/borrow records removed).",
        removed.expenses, removed.categories, removed.debts
    ));
    Ok(())
}
