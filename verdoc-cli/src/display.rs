use colored::Colorize;
use verdoc_core::{Patch, Token, Version};

pub const BANNER: &str = "Commands: create, append, remove, commit, undo, log, show, rollback, \
branch, checkout, rebase, diff, filter, avg, status, branches, save, load, help, exit";

pub const HELP: &str = r#"
[Help] Available commands:
create <text>       - Create a new document with initial content
append <text>       - Append text to the current document
remove <n>          - Remove last n characters
commit <message>    - Commit the current document with a message
undo                - Undo last uncommitted change
log                 - Show commit history for current branch
show [id]           - Show content of version (or latest if no id)
rollback <id>       - Set head to previous version by ID
branch <name>       - Create a new branch at current head
checkout <name>     - Switch to another branch
rebase <branch>     - Rebase current branch onto another
diff <v1> <v2>      - Show diff between two versions
filter <keyword>    - Show versions with message containing keyword
avg                 - Show average number of characters per version
status              - Show branch, head and buffer state
branches            - List branches
save                - Save history
load                - Load history
help                - Show this help message
exit                - Exit the program
"#;

/// Removed characters in red, inserted in green, kept ones plain.
pub fn render_patch(patch: &Patch) -> String {
    let mut out = String::new();
    for token in patch.tokens() {
        let piece = match token {
            Token::Keep(c) => c.to_string().normal(),
            Token::Remove(c) => c.to_string().red(),
            Token::Insert(c) => c.to_string().green(),
        };
        out.push_str(&piece.to_string());
    }
    out
}

pub fn version_line(version: &Version) -> String {
    format!(
        "{} | {} | {}",
        format!("#{}", version.id).yellow(),
        version.timestamp.dimmed(),
        version.message
    )
}
