//! Filesystem commands: `ls`, `cd`, `pwd`, `cat`, `mkdir`, `touch`, `rm`,
//! `rmdir`, `cp`.
//!
//! Commands that take several paths process them in order. A failing path
//! produces an error record and does not stop the others; writes that did
//! succeed are kept.

use crate::commands::{ArgKind, CommandResult, CommandSpec, OptionSchema, ParsedOptions};
use crate::emulator::EmulatorState;
use crate::error::{CommandError, FsError};
use crate::filesystem::{DirEntry, FsNode, VirtualFs};
use crate::models::OutputRecord;

fn fs_error(opts: &ParsedOptions, typed: &str, err: FsError) -> OutputRecord {
    OutputRecord::error(CommandError::fs(opts.command(), err.with_path(typed)).to_string())
}

/// Apply a write to every path argument, threading the filesystem through.
fn write_each<F>(state: &EmulatorState, opts: &ParsedOptions, write: F) -> CommandResult
where
    F: Fn(&VirtualFs, &str) -> Result<VirtualFs, FsError>,
{
    let mut fs = state.fs().clone();
    let mut output = Vec::new();

    for typed in opts.args() {
        let path = state.env().resolve_path(typed);
        match write(&fs, &path) {
            Ok(updated) => fs = updated,
            Err(err) => output.push(fs_error(opts, typed, err)),
        }
    }

    CommandResult::output(output).with_fs(fs)
}

// =============================================================================
// ls
// =============================================================================

pub(super) fn ls_spec() -> CommandSpec {
    CommandSpec::new(
        OptionSchema::none()
            .flag("all", Some('a'))
            .flag("long", Some('l'))
            .args(ArgKind::Path, 0, None),
        ls,
    )
    .with_summary("list directory contents")
}

fn ls(state: &EmulatorState, opts: &ParsedOptions) -> Result<CommandResult, CommandError> {
    let targets: Vec<String> = if opts.args().is_empty() {
        vec![".".to_string()]
    } else {
        opts.args().to_vec()
    };
    let show_headers = targets.len() > 1;
    let mut output = Vec::new();

    for typed in &targets {
        let path = state.env().resolve_path(typed);
        match state.fs().resolve(&path) {
            Ok(FsNode::File(content)) => {
                let entry = DirEntry {
                    name: typed.clone(),
                    is_dir: false,
                };
                output.push(OutputRecord::text(format_entry(&entry, content.len(), opts)));
            }
            Ok(FsNode::Directory(_)) => {
                let entries = state
                    .fs()
                    .list_entries(&path)
                    .map_err(|err| CommandError::fs(opts.command(), err.with_path(typed)))?;
                let listing = format_listing(state.fs(), &path, entries, opts);
                let text = match (show_headers, listing.is_empty()) {
                    (true, _) => format!("{}:\n{}", typed, listing),
                    (false, false) => listing,
                    (false, true) => continue,
                };
                output.push(OutputRecord::text(text.trim_end().to_string()));
            }
            Err(err) => output.push(fs_error(opts, typed, err)),
        }
    }

    Ok(CommandResult::output(output))
}

/// Directories first, then regular files, then hidden files; alphabetical
/// within each group. Hidden entries only with `-a`.
fn format_listing(fs: &VirtualFs, dir: &str, mut entries: Vec<DirEntry>, opts: &ParsedOptions) -> String {
    let show_hidden = opts.has("all");
    entries.retain(|e| show_hidden || !e.name.starts_with('.'));
    entries.sort_by(|a, b| {
        let a_hidden = a.name.starts_with('.');
        let b_hidden = b.name.starts_with('.');

        match (a.is_dir, b.is_dir, a_hidden, b_hidden) {
            (true, false, _, _) => std::cmp::Ordering::Less,
            (false, true, _, _) => std::cmp::Ordering::Greater,
            (_, _, false, true) => std::cmp::Ordering::Less,
            (_, _, true, false) => std::cmp::Ordering::Greater,
            _ => a.name.cmp(&b.name),
        }
    });

    entries
        .iter()
        .map(|entry| {
            let size = match fs.resolve(&VirtualFs::join_path(dir, &entry.name)) {
                Ok(FsNode::File(content)) => content.len(),
                Ok(FsNode::Directory(children)) => children.len(),
                Err(_) => 0,
            };
            format_entry(entry, size, opts)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn format_entry(entry: &DirEntry, size: usize, opts: &ParsedOptions) -> String {
    let name = if entry.is_dir {
        format!("{}/", entry.name)
    } else {
        entry.name.clone()
    };
    if !opts.has("long") {
        return name;
    }
    let perms = if entry.is_dir { "dr-x" } else { "-rw-" };
    format!("{} {:>6} {}", perms, size, name)
}

// =============================================================================
// cd / pwd
// =============================================================================

pub(super) fn cd_spec() -> CommandSpec {
    CommandSpec::new(OptionSchema::none().args(ArgKind::Path, 0, Some(1)), cd)
        .with_summary("change the working directory")
}

fn cd(state: &EmulatorState, opts: &ParsedOptions) -> Result<CommandResult, CommandError> {
    let typed = opts.args().first().map(String::as_str).unwrap_or("~");
    let path = state.env().resolve_path(typed);

    match state.fs().resolve(&path) {
        Ok(FsNode::Directory(_)) => Ok(CommandResult::empty().with_env(state.env().with_cwd(&path))),
        Ok(FsNode::File(_)) => Err(CommandError::fs(
            opts.command(),
            FsError::NotADirectory(typed.to_string()),
        )),
        Err(err) => Err(CommandError::fs(opts.command(), err.with_path(typed))),
    }
}

pub(super) fn pwd_spec() -> CommandSpec {
    CommandSpec::new(OptionSchema::none(), pwd).with_summary("print the working directory")
}

fn pwd(state: &EmulatorState, _opts: &ParsedOptions) -> Result<CommandResult, CommandError> {
    Ok(CommandResult::text(state.env().cwd()))
}

// =============================================================================
// cat
// =============================================================================

pub(super) fn cat_spec() -> CommandSpec {
    CommandSpec::new(OptionSchema::none().args(ArgKind::Path, 1, None), cat)
        .with_summary("print file contents")
}

fn cat(state: &EmulatorState, opts: &ParsedOptions) -> Result<CommandResult, CommandError> {
    let output = opts
        .args()
        .iter()
        .map(|typed| {
            let path = state.env().resolve_path(typed);
            match state.fs().read(&path) {
                Ok(content) => OutputRecord::text(content),
                Err(err) => fs_error(opts, typed, err),
            }
        })
        .collect();

    Ok(CommandResult::output(output))
}

// =============================================================================
// mkdir / touch
// =============================================================================

pub(super) fn mkdir_spec() -> CommandSpec {
    CommandSpec::new(
        OptionSchema::none()
            .flag("parents", Some('p'))
            .args(ArgKind::Path, 1, None),
        mkdir,
    )
    .with_summary("create directories")
}

fn mkdir(state: &EmulatorState, opts: &ParsedOptions) -> Result<CommandResult, CommandError> {
    let parents = opts.has("parents");
    Ok(write_each(state, opts, |fs, path| {
        if parents {
            fs.create_dir_all(path)
        } else {
            fs.create_dir(path)
        }
    }))
}

pub(super) fn touch_spec() -> CommandSpec {
    CommandSpec::new(OptionSchema::none().args(ArgKind::Path, 1, None), touch)
        .with_summary("create empty files")
}

fn touch(state: &EmulatorState, opts: &ParsedOptions) -> Result<CommandResult, CommandError> {
    Ok(write_each(state, opts, |fs, path| {
        if fs.exists(path) {
            Ok(fs.clone())
        } else {
            fs.write_file(path, "")
        }
    }))
}

// =============================================================================
// rm / rmdir
// =============================================================================

pub(super) fn rm_spec() -> CommandSpec {
    CommandSpec::new(
        OptionSchema::none()
            .flag("recursive", Some('r'))
            .args(ArgKind::Path, 1, None),
        rm,
    )
    .with_summary("remove files or directories")
}

fn rm(state: &EmulatorState, opts: &ParsedOptions) -> Result<CommandResult, CommandError> {
    let recursive = opts.has("recursive");
    Ok(write_each(state, opts, |fs, path| {
        if recursive {
            fs.remove_all(path)
        } else {
            fs.remove_file(path)
        }
    }))
}

pub(super) fn rmdir_spec() -> CommandSpec {
    CommandSpec::new(OptionSchema::none().args(ArgKind::Path, 1, None), rmdir)
        .with_summary("remove empty directories")
}

fn rmdir(state: &EmulatorState, opts: &ParsedOptions) -> Result<CommandResult, CommandError> {
    Ok(write_each(state, opts, |fs, path| fs.remove_dir(path)))
}

// =============================================================================
// cp
// =============================================================================

pub(super) fn cp_spec() -> CommandSpec {
    CommandSpec::new(
        OptionSchema::none()
            .flag("recursive", Some('r'))
            .args(ArgKind::Path, 2, Some(2)),
        cp,
    )
    .with_summary("copy files and directories")
}

fn cp(state: &EmulatorState, opts: &ParsedOptions) -> Result<CommandResult, CommandError> {
    let [src, dest] = opts.args() else {
        return Err(CommandError::failed(opts.command(), "expected SOURCE and DEST"));
    };
    let src_path = state.env().resolve_path(src);
    let fs = state
        .fs()
        .copy(&src_path, &state.env().resolve_path(dest), opts.has("recursive"))
        .map_err(|err| {
            let typed = if err.path() == src_path { src } else { dest };
            CommandError::fs(opts.command(), err.with_path(typed.as_str()))
        })?;

    Ok(CommandResult::empty().with_fs(fs))
}

#[cfg(test)]
mod tests {
    use crate::commands::CommandTable;
    use crate::emulator::EmulatorState;
    use crate::filesystem::VirtualFs;
    use crate::models::OutputRecord;

    fn state() -> EmulatorState {
        let fs = VirtualFs::from_entries([
            ("/README.txt", Some("hello\nworld".to_string())),
            ("/etc", None),
            ("/etc/hosts", Some("Niv\nAvishai".to_string())),
            ("/etc/hostname", Some("sudovisudo.wtf".to_string())),
            ("/.profile", Some("export X=1".to_string())),
            ("/empty", None),
        ])
        .unwrap();
        EmulatorState::new(fs, CommandTable::with_defaults())
    }

    fn run(state: &EmulatorState, line: &str) -> (EmulatorState, Vec<OutputRecord>) {
        let next = state.execute(line);
        let output = next.outputs()[1..].to_vec();
        (next, output)
    }

    #[test]
    fn test_ls_root() {
        let (_, out) = run(&state(), "ls");
        assert_eq!(out, vec![OutputRecord::text("empty/\netc/\nREADME.txt")]);
    }

    #[test]
    fn test_ls_all_shows_hidden_last() {
        let (_, out) = run(&state(), "ls -a /");
        assert_eq!(
            out,
            vec![OutputRecord::text("empty/\netc/\nREADME.txt\n.profile")]
        );
    }

    #[test]
    fn test_ls_long() {
        let (_, out) = run(&state(), "ls -l /etc");
        assert_eq!(
            out,
            vec![OutputRecord::text(
                "-rw-     14 hostname\n-rw-     11 hosts"
            )]
        );
    }

    #[test]
    fn test_ls_file_and_empty_dir() {
        let (_, out) = run(&state(), "ls README.txt");
        assert_eq!(out, vec![OutputRecord::text("README.txt")]);

        let (_, out) = run(&state(), "ls empty");
        assert!(out.is_empty());
    }

    #[test]
    fn test_ls_missing() {
        let (_, out) = run(&state(), "ls nope");
        assert_eq!(
            out,
            vec![OutputRecord::error("ls: nope: No such file or directory")]
        );
    }

    #[test]
    fn test_ls_multiple_targets() {
        let (_, out) = run(&state(), "ls etc empty");
        assert_eq!(
            out,
            vec![
                OutputRecord::text("etc:\nhostname\nhosts"),
                OutputRecord::text("empty:"),
            ]
        );
    }

    #[test]
    fn test_cd_and_pwd() {
        let (next, out) = run(&state(), "cd etc");
        assert!(out.is_empty());
        assert_eq!(next.env().cwd(), "/etc");

        let (_, out) = run(&next, "pwd");
        assert_eq!(out, vec![OutputRecord::text("/etc")]);

        let (home, _) = run(&next, "cd");
        assert_eq!(home.env().cwd(), "/");
    }

    #[test]
    fn test_cd_errors() {
        let (next, out) = run(&state(), "cd README.txt");
        assert_eq!(
            out,
            vec![OutputRecord::error("cd: README.txt: Not a directory")]
        );
        assert_eq!(next.env().cwd(), "/");

        let (_, out) = run(&state(), "cd nope");
        assert_eq!(
            out,
            vec![OutputRecord::error("cd: nope: No such file or directory")]
        );
    }

    #[test]
    fn test_cat() {
        let (_, out) = run(&state(), "cat /README.txt");
        assert_eq!(out, vec![OutputRecord::text("hello\nworld")]);

        let (_, out) = run(&state(), "cat etc /etc/hostname");
        assert_eq!(
            out,
            vec![
                OutputRecord::error("cat: etc: Is a directory"),
                OutputRecord::text("sudovisudo.wtf"),
            ]
        );
    }

    #[test]
    fn test_cat_relative_to_cwd() {
        let (next, _) = run(&state(), "cd /etc");
        let (_, out) = run(&next, "cat hostname");
        assert_eq!(out, vec![OutputRecord::text("sudovisudo.wtf")]);
    }

    #[test]
    fn test_mkdir() {
        let (next, out) = run(&state(), "mkdir tmp");
        assert!(out.is_empty());
        assert!(next.fs().is_directory("/tmp"));

        let (_, out) = run(&next, "mkdir tmp");
        assert_eq!(out, vec![OutputRecord::error("mkdir: tmp: File exists")]);

        let (_, out) = run(&state(), "mkdir a/b");
        assert_eq!(
            out,
            vec![OutputRecord::error("mkdir: a/b: No such file or directory")]
        );

        let (next, out) = run(&state(), "mkdir -p a/b");
        assert!(out.is_empty());
        assert!(next.fs().is_directory("/a/b"));
    }

    #[test]
    fn test_touch() {
        let (next, _) = run(&state(), "touch notes.txt README.txt");
        assert_eq!(next.fs().read("/notes.txt").unwrap(), "");
        assert_eq!(next.fs().read("/README.txt").unwrap(), "hello\nworld");
    }

    #[test]
    fn test_rm() {
        let (next, out) = run(&state(), "rm README.txt etc");
        assert_eq!(out, vec![OutputRecord::error("rm: etc: Is a directory")]);
        assert!(!next.fs().exists("/README.txt"));
        assert!(next.fs().exists("/etc"));

        let (next, out) = run(&state(), "rm -r etc");
        assert!(out.is_empty());
        assert!(!next.fs().exists("/etc"));
    }

    #[test]
    fn test_rmdir() {
        let (_, out) = run(&state(), "rmdir etc");
        assert_eq!(
            out,
            vec![OutputRecord::error("rmdir: etc: Directory not empty")]
        );

        let (next, out) = run(&state(), "rmdir empty");
        assert!(out.is_empty());
        assert!(!next.fs().exists("/empty"));
    }

    #[test]
    fn test_cp() {
        let (next, out) = run(&state(), "cp README.txt empty");
        assert!(out.is_empty());
        assert_eq!(next.fs().read("/empty/README.txt").unwrap(), "hello\nworld");

        let (_, out) = run(&state(), "cp etc backup");
        assert_eq!(out, vec![OutputRecord::error("cp: etc: Is a directory")]);

        let (next, _) = run(&state(), "cp -r etc backup");
        assert_eq!(next.fs().read("/backup/hosts").unwrap(), "Niv\nAvishai");

        let (_, out) = run(&state(), "cp missing x");
        assert_eq!(
            out,
            vec![OutputRecord::error("cp: missing: No such file or directory")]
        );
    }

    #[test]
    fn test_cp_wrong_arity() {
        let (_, out) = run(&state(), "cp a");
        assert_eq!(
            out,
            vec![OutputRecord::error(
                "cp: missing operand (expected at least 2)"
            )]
        );
    }
}
