use v0_flight::{extract_files, ExtractError};

fn script(payload: &str) -> String {
    format!(r#"<script>self.__next_f.push([1,"{payload}"])</script>"#)
}

/// A cut-down preview page: framework noise, quoted records, a raw text
/// record, descriptors split across chunks, and one dangling reference.
fn preview_page() -> String {
    let head = r#"<!DOCTYPE html><html><head><title>preview</title></head><body><div id="root"></div>"#;
    let chunks = [
        // Framework preamble records that are not files.
        script(r#"0:\"$L1\"\n2:[\"$\",\"html\",null,{}]\n"#),
        // Quoted record with escaped content.
        script(r#"a1:\"import { x } from \\\"./x\\\";\\nexport const y = x;\\n\"\n"#),
        // Raw text record, length 0x10 = 16 chars, split across two pushes.
        script(r#"b2:T10,const n"#),
        script(r#" = 1;\nrest of payload\n"#),
        // Descriptor list referencing both records plus a dangling one.
        script(
            r#"3:[[\"lib/util.ts\",{\"type\":\"file\",\"data\":\"$a1\"}],[\"lib/n.ts\",{\"type\":\"file\",\"data\":\"$b2\"}],[\"missing.css\",{\"type\":\"file\",\"data\":\"$zz\"}]]\n"#,
        ),
        // Hot-patch: lib/n.ts repointed at a chained reference.
        script(r#"c3:\"$a1\"\n[\"lib/n.ts\",{\"type\":\"file\",\"data\":\"$c3\"}]\n"#),
    ];
    format!("{head}{}</body></html>", chunks.join("\n"))
}

#[test]
fn decodes_a_full_preview_page() {
    let extraction = extract_files(&preview_page()).expect("extraction");

    let names: Vec<&str> = extraction
        .files
        .iter()
        .map(|file| file.name.as_str())
        .collect();
    assert_eq!(names, vec!["lib/util.ts", "lib/n.ts"]);

    assert_eq!(
        extraction.files[0].content,
        "import { x } from \"./x\";\nexport const y = x;\n"
    );

    // Hot-patched descriptor resolves through c3 -> a1.
    assert_eq!(extraction.files[1].content, extraction.files[0].content);

    assert_eq!(extraction.unresolved.len(), 1);
    assert_eq!(extraction.unresolved[0].describe(), "missing.css ($zz)");
}

#[test]
fn raw_text_record_resolves_before_hot_patch_is_applied() {
    // Drop the final hot-patch chunk so lib/n.ts still points at b2.
    let page = preview_page();
    let trimmed = &page[..page.rfind("<script>self.__next_f").expect("last chunk")];

    let extraction = extract_files(trimmed).expect("extraction");
    let n = extraction
        .files
        .iter()
        .find(|file| file.name == "lib/n.ts")
        .expect("lib/n.ts");
    assert_eq!(n.content, "const n = 1;\nres");
}

#[test]
fn page_without_flight_payload_fails_cleanly() {
    let err = extract_files("<html><body><p>plain</p></body></html>").unwrap_err();
    assert!(matches!(err, ExtractError::NoFlightChunks));
    assert_eq!(
        err.to_string(),
        "Unable to parse Next.js flight chunks from preview HTML"
    );
}
