//! # v0 Flight Decoder
//!
//! Recovers the source files embedded in a rendered v0.app preview page.
//!
//! Preview pages stream their payload as escaped string fragments pushed
//! through inline `self.__next_f.push([1,"…"])` script statements. Unescaped
//! and concatenated, the fragments form one loose line-oriented buffer that
//! mixes JSON-like records, length-prefixed raw text blocks, and `$id`
//! references between them. This crate turns that buffer back into files.
//!
//! ## Pipeline
//!
//! ```text
//! Preview HTML
//!     │
//!     ├──> Chunk collection
//!     │    ├─> match push statements in document order
//!     │    └─> JSON-string-unescape and concatenate
//!     │
//!     ├──> Reference table
//!     │    ├─> id:"escaped"  (quoted records)
//!     │    └─> id:Thexlen,   (raw text records, length in chars)
//!     │
//!     └──> File resolution
//!          ├─> ["name",{"type":"file","data":"$id"}] descriptors
//!          ├─> follow reference chains with a cycle guard
//!          └─> emit Extraction { files, unresolved }
//! ```
//!
//! Decoding is pure text processing: no I/O, no shared state, every call an
//! independent function of its input.
//!
//! ## Example
//!
//! ```rust
//! use v0_flight::extract_files;
//!
//! let html = r#"<script>self.__next_f.push([1,"1:\"body\"\n[\"a.txt\",{\"type\":\"file\",\"data\":\"$1\"}]"])</script>"#;
//! let extraction = extract_files(html).unwrap();
//! assert_eq!(extraction.files[0].name, "a.txt");
//! assert_eq!(extraction.files[0].content, "body");
//! ```

mod chunks;
mod error;
mod escape;
mod extract;
mod refs;
mod resolve;
mod types;

pub use chunks::collect_flight_chunks;
pub use error::{ExtractError, Result};
pub use escape::{decode_json_string, normalize_escapes};
pub use extract::extract_files;
pub use refs::ReferenceTable;
pub use resolve::{resolve_content, resolve_descriptors, scan_descriptors};
pub use types::{Extraction, FileDescriptor, RefValue, ResolvedFile, UnresolvedRef};
