use crate::archive::codec::MemberKind;
use std::ffi::OsString;
use std::path::{Component, Path, PathBuf};

/// Decide whether an archive member may be extracted under `dest_root`.
///
/// Rejects members whose path is absolute, contains an embedded NUL byte,
/// or lexically escapes `dest_root` once `..`/`.` components are resolved.
/// Symlink targets are resolved relative to the link's own parent directory
/// inside the destination tree; hard-link targets are validated like member
/// paths. Resolution is lexical, so targets that do not exist yet are fine.
///
/// Never errors: anything that cannot be proven safe is unsafe.
pub fn is_safe_member(
    member_path: &Path,
    kind: MemberKind,
    link_target: Option<&Path>,
    dest_root: &Path,
) -> bool {
    // Symlink loops inside dest_root are the OS's problem; escaping it is ours.
    let root = dest_root
        .canonicalize()
        .unwrap_or_else(|_| dest_root.to_path_buf());

    let Some(resolved) = resolve_within(&root, member_path) else {
        return false;
    };

    match kind {
        MemberKind::Symlink => {
            let Some(target) = link_target else {
                return false;
            };
            if !is_plausible_relative(target) {
                return false;
            }
            // The target is interpreted by the OS relative to the symlink's
            // parent directory, not the extraction root.
            let parent = resolved
                .strip_prefix(&root)
                .ok()
                .and_then(|rel| rel.parent())
                .map(Path::to_path_buf)
                .unwrap_or_default();
            resolve_within(&root, &parent.join(target)).is_some()
        }
        MemberKind::HardLink => match link_target {
            Some(target) => {
                is_plausible_relative(target) && resolve_within(&root, target).is_some()
            }
            None => false,
        },
        _ => true,
    }
}

fn is_plausible_relative(path: &Path) -> bool {
    !path.as_os_str().is_empty()
        && !path.has_root()
        && !path.is_absolute()
        && !contains_nul(path)
}

fn contains_nul(path: &Path) -> bool {
    path.as_os_str().as_encoded_bytes().contains(&0)
}

/// Lexically join `rel` onto `root`, resolving `.` and `..` without touching
/// the filesystem. Returns `None` if `rel` is absolute, empty, contains a
/// NUL byte, or would climb above `root`.
fn resolve_within(root: &Path, rel: &Path) -> Option<PathBuf> {
    if rel.as_os_str().is_empty() || contains_nul(rel) {
        return None;
    }

    let mut stack: Vec<OsString> = Vec::new();
    for component in rel.components() {
        match component {
            Component::Normal(name) => stack.push(name.to_os_string()),
            Component::CurDir => {}
            Component::ParentDir => {
                // Popping an empty stack means escaping the root.
                stack.pop()?;
            }
            Component::RootDir | Component::Prefix(_) => return None,
        }
    }

    let mut resolved = root.to_path_buf();
    for name in stack {
        resolved.push(name);
    }
    Some(resolved)
}
