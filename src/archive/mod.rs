pub mod codec;
pub mod safety;

pub use codec::{ArchiveCodec, ArchiveMember, MemberKind, Unpacked};
pub use safety::is_safe_member;
