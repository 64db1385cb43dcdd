use std::path::PathBuf;

use spendify_core::{ExportKind, ExportService};

use crate::cli::core::{usage, CommandResult, ShellContext};
use crate::cli::io;
use crate::cli::registry::CommandEntry;

const USAGE: &str = "export <expenses|lendings|borrowings> <file.csv>";

pub(crate) fn definitions() -> Vec<CommandEntry> {
    vec![CommandEntry::new(
        "export",
        "Write expenses or lend/borrow records to CSV",
        USAGE,
        cmd_export,
    )]
}

fn cmd_export(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let [kind, path] = args else {
        return Err(usage(USAGE));
    };
    let kind: ExportKind = kind.parse()?;
    let path = PathBuf::from(path);
    let session = context.app.require_session()?;
    context.app.require_online("Exporting")?;
    let export = ExportService::write(context.app.backend(), &session, kind, &path)?;
    io::print_success(format!(
        "Exported {} {} row(s) to {}.",
        export.rows,
        export.kind,
        path.display()
    ));
    Ok(())
}
