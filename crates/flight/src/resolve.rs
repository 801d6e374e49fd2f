use std::collections::{HashMap, HashSet};

use once_cell::sync::Lazy;
use regex::Regex;

use crate::escape::decode_json_string;
use crate::refs::ReferenceTable;
use crate::types::{FileDescriptor, RefValue, ResolvedFile, UnresolvedRef};

/// `["name",{"type":"file","data":"ref"}]`, one extractable file per match.
static FILE_DESCRIPTOR: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"\["([^"\n]+)",\{"type":"file","data":"(\$?[^"\n]+)"\}\]"#)
        .expect("file descriptor pattern")
});

/// Scan the decoded buffer for file descriptors, deduplicated by file name.
///
/// The payload hot-patches entries, so when a name repeats the later
/// descriptor's data pointer wins while the list keeps the position of the
/// first occurrence.
#[must_use]
pub fn scan_descriptors(decoded: &str) -> Vec<FileDescriptor> {
    let mut order: Vec<FileDescriptor> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();

    for caps in FILE_DESCRIPTOR.captures_iter(decoded) {
        let (Some(name), Some(data)) = (caps.get(1), caps.get(2)) else {
            continue;
        };
        let descriptor = FileDescriptor {
            name: name.as_str().to_string(),
            data: RefValue::classify(data.as_str()),
        };
        match index.get(name.as_str()) {
            Some(&at) => order[at] = descriptor,
            None => {
                index.insert(name.as_str().to_string(), order.len());
                order.push(descriptor);
            }
        }
    }

    order
}

/// Follow a descriptor's data pointer to literal content.
///
/// A literal pointer is JSON-string-unescaped directly, falling back to the
/// raw text when it does not parse. A reference walks the table until a
/// literal turns up; a dangling identifier or a revisited one (reference
/// cycle) fails the descriptor.
#[must_use]
pub fn resolve_content(data: &RefValue, refs: &ReferenceTable) -> Option<String> {
    let mut current = match data {
        RefValue::Literal(escaped) => {
            return Some(decode_json_string(escaped).unwrap_or_else(|| escaped.clone()));
        }
        RefValue::Reference(id) => id.as_str(),
    };

    let mut visited: HashSet<&str> = HashSet::new();
    loop {
        if !visited.insert(current) {
            return None;
        }
        match refs.get(current)? {
            RefValue::Literal(text) => return Some(text.clone()),
            RefValue::Reference(next) => current = next.as_str(),
        }
    }
}

/// Resolve every descriptor, splitting successes from failures.
///
/// Resolved content gets `\r\n` collapsed to `\n`; failures keep the original
/// pointer spelling for diagnostics.
#[must_use]
pub fn resolve_descriptors(
    descriptors: &[FileDescriptor],
    refs: &ReferenceTable,
) -> (Vec<ResolvedFile>, Vec<UnresolvedRef>) {
    let mut files = Vec::new();
    let mut unresolved = Vec::new();

    for descriptor in descriptors {
        match resolve_content(&descriptor.data, refs) {
            Some(content) => {
                let content = content.replace("\r\n", "\n");
                files.push(ResolvedFile::new(descriptor.name.clone(), content));
            }
            None => unresolved.push(UnresolvedRef {
                name: descriptor.name.clone(),
                data_ref: descriptor.data.as_data_ref(),
            }),
        }
    }

    (files, unresolved)
}
