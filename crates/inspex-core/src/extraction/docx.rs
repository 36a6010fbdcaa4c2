use crate::error::InspexError;

/// Text of every top-level paragraph, one per line.
///
/// Empty paragraphs are kept as empty lines so vertical spacing survives.
pub fn paragraph_text(bytes: &[u8]) -> Result<String, InspexError> {
    let docx = docx_rs::read_docx(bytes)
        .map_err(|e| InspexError::decode("word-processor", format!("failed to parse DOCX: {e}")))?;

    let paragraphs: Vec<String> = docx
        .document
        .children
        .iter()
        .filter_map(|child| match child {
            docx_rs::DocumentChild::Paragraph(p) => Some(paragraph(p)),
            _ => None,
        })
        .collect();

    Ok(paragraphs.join("\n"))
}

fn paragraph(paragraph: &docx_rs::Paragraph) -> String {
    let mut buffer = String::new();
    for child in &paragraph.children {
        paragraph_child(child, &mut buffer);
    }
    buffer
}

fn paragraph_child(child: &docx_rs::ParagraphChild, buffer: &mut String) {
    match child {
        docx_rs::ParagraphChild::Run(run) => push_run(run, buffer),
        docx_rs::ParagraphChild::Hyperlink(link) => {
            for link_child in &link.children {
                paragraph_child(link_child, buffer);
            }
        }
        docx_rs::ParagraphChild::Insert(insert) => {
            for insert_child in &insert.children {
                if let docx_rs::InsertChild::Run(run) = insert_child {
                    push_run(run, buffer);
                }
            }
        }
        _ => {}
    }
}

fn push_run(run: &docx_rs::Run, buffer: &mut String) {
    for child in &run.children {
        match child {
            docx_rs::RunChild::Text(text) => buffer.push_str(&text.text),
            docx_rs::RunChild::Tab(_) => buffer.push('\t'),
            docx_rs::RunChild::Break(_) => buffer.push('\n'),
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use docx_rs::{Docx, Paragraph, Run};

    fn build_docx(paragraphs: &[&str]) -> Vec<u8> {
        let mut doc = Docx::new();
        for text in paragraphs {
            let mut p = Paragraph::new();
            if !text.is_empty() {
                p = p.add_run(Run::new().add_text(*text));
            }
            doc = doc.add_paragraph(p);
        }
        let mut buf = std::io::Cursor::new(Vec::new());
        doc.build().pack(&mut buf).expect("pack docx");
        buf.into_inner()
    }

    #[test]
    fn test_paragraphs_joined_with_newlines() {
        let bytes = build_docx(&["Inspection plan", "", "Op 10: deburr"]);
        let text = paragraph_text(&bytes).unwrap();
        assert_eq!(text, "Inspection plan\n\nOp 10: deburr");
    }

    #[test]
    fn test_corrupt_docx_is_decode_error() {
        let err = paragraph_text(b"PK\x03\x04 broken").unwrap_err();
        assert!(matches!(err, InspexError::Decode { .. }));
    }
}
