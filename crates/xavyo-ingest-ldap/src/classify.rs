//! Entry classification by object class.

use crate::client::DirectoryEntry;

/// Attribute holding an entry's object classes.
pub const OBJECT_CLASS_ATTRIBUTE: &str = "objectClass";

/// Object classes that mark a person.
pub const USER_OBJECT_CLASSES: [&str; 3] = ["inetOrgPerson", "posixAccount", "person"];

/// Object classes that mark a group.
pub const GROUP_OBJECT_CLASSES: [&str; 3] = ["posixGroup", "organizationalUnit", "group"];

/// What an entry turns into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    User,
    Group,
    /// Neither; recorded as dropped.
    Other,
}

/// Classify an entry. User classes win over group classes.
pub fn classify(entry: &DirectoryEntry) -> EntryKind {
    let classes = entry.values(OBJECT_CLASS_ATTRIBUTE);
    let has_any = |wanted: &[&str]| {
        classes
            .iter()
            .any(|class| wanted.iter().any(|w| class.as_slice() == w.as_bytes()))
    };

    if has_any(&USER_OBJECT_CLASSES) {
        EntryKind::User
    } else if has_any(&GROUP_OBJECT_CLASSES) {
        EntryKind::Group
    } else {
        EntryKind::Other
    }
}
