//! Document type classification.
//!
//! Two heuristics in priority order:
//!
//! 1. **Filename**: the lower-cased filename is tested against
//!    [`FILENAME_PATTERNS`]; the first pattern whose fragments all occur wins.
//!    Submitting systems name their exports consistently, so this is the
//!    fast path.
//! 2. **Content**: the parsed tree is tested against one structural
//!    predicate per kind, in [`CONTENT_ORDER`]; the first match wins.
//!
//! A document matching neither is `Unknown`. A document that is not
//! well-formed XML is `Unknown` regardless of its filename, with the parse
//! error handed back to the caller.

use licenzia_core::{ClassificationResult, ConfidenceSource, DocumentKind, RawDocument};
use roxmltree::{Document, Node};
use tracing::debug;

use crate::xml::{self, APPLICATION_NS, XmlError};

/// A filename pattern: every fragment must occur in the lower-cased name.
#[derive(Debug, Clone, Copy)]
pub struct FilenamePattern {
    pub fragments: &'static [&'static str],
    pub kind: DocumentKind,
}

/// Ordered filename patterns. More specific patterns precede the general
/// ones they overlap with (payments before the fines catch-all).
pub const FILENAME_PATTERNS: &[FilenamePattern] = &[
    FilenamePattern {
        fragments: &["заявление"],
        kind: DocumentKind::Application,
    },
    FilenamePattern {
        fragments: &["доверенност"],
        kind: DocumentKind::PowerOfAttorney,
    },
    FilenamePattern {
        fragments: &["егрн"],
        kind: DocumentKind::CadastralExtract,
    },
    FilenamePattern {
        fragments: &["егрюл"],
        kind: DocumentKind::CompanyRegistry,
    },
    FilenamePattern {
        fragments: &["рнип", "оплат"],
        kind: DocumentKind::DutyPayment,
    },
    FilenamePattern {
        fragments: &["рнип"],
        kind: DocumentKind::FinesRecord,
    },
    FilenamePattern {
        fragments: &["фнс", "задолженност"],
        kind: DocumentKind::TaxDebt,
    },
    FilenamePattern {
        fragments: &["кпп"],
        kind: DocumentKind::SubdivisionTax,
    },
];

/// Order in which content predicates are tried.
pub const CONTENT_ORDER: [DocumentKind; 6] = [
    DocumentKind::Application,
    DocumentKind::TaxDebt,
    DocumentKind::CompanyRegistry,
    DocumentKind::SubdivisionTax,
    DocumentKind::DutyPayment,
    DocumentKind::CadastralExtract,
];

/// Classification of a raw document plus the parse failure, if any.
#[derive(Debug)]
pub struct Classified {
    pub result: ClassificationResult,
    pub diagnostic: Option<XmlError>,
}

/// Classify a raw document. Never fails: malformed input is `Unknown`.
pub fn classify(doc: &RawDocument) -> Classified {
    let parsed = xml::decode(&doc.content).and_then(|text| {
        let tree = xml::parse(&text)?;
        Ok(classify_parsed(&doc.filename, &tree))
    });
    match parsed {
        Ok(result) => Classified {
            result,
            diagnostic: None,
        },
        Err(e) => Classified {
            result: ClassificationResult::Unknown,
            diagnostic: Some(e),
        },
    }
}

/// Classify an already parsed document.
pub fn classify_parsed(filename: &str, tree: &Document<'_>) -> ClassificationResult {
    if let Some(kind) = classify_filename(filename) {
        debug!(filename, %kind, "classified by filename");
        return ClassificationResult::Known {
            kind,
            source: ConfidenceSource::Filename,
        };
    }
    if let Some(kind) = classify_content(tree) {
        debug!(filename, %kind, "classified by content");
        return ClassificationResult::Known {
            kind,
            source: ConfidenceSource::Content,
        };
    }
    debug!(filename, "no classification heuristic matched");
    ClassificationResult::Unknown
}

pub fn classify_filename(filename: &str) -> Option<DocumentKind> {
    let name = filename.to_lowercase();
    FILENAME_PATTERNS
        .iter()
        .find(|p| p.fragments.iter().all(|f| name.contains(f)))
        .map(|p| p.kind)
}

pub fn classify_content(tree: &Document<'_>) -> Option<DocumentKind> {
    let root = tree.root();
    CONTENT_ORDER
        .into_iter()
        .find(|&kind| content_matches(kind, root))
}

/// The single distinguishing predicate for each kind.
///
/// Powers of attorney and fines records have no stable structure across
/// issuing systems and are only recognised by filename.
fn content_matches(kind: DocumentKind, root: Node<'_, '_>) -> bool {
    match kind {
        DocumentKind::Application => is_application_form(root),
        DocumentKind::TaxDebt => is_tax_debt_notice(root),
        DocumentKind::CompanyRegistry => is_company_registry_extract(root),
        DocumentKind::SubdivisionTax => is_subdivision_record(root),
        DocumentKind::DutyPayment => is_payment_confirmation(root),
        DocumentKind::CadastralExtract => is_cadastral_extract(root),
        DocumentKind::PowerOfAttorney | DocumentKind::FinesRecord => false,
    }
}

fn is_application_form(root: Node<'_, '_>) -> bool {
    xml::descendant_ns(root, APPLICATION_NS, "BaseDeclarant").is_some()
}

fn is_tax_debt_notice(root: Node<'_, '_>) -> bool {
    xml::descendant_text(root, "ЗагДок")
        .is_some_and(|title| title.to_lowercase().contains("задолженност"))
}

fn is_company_registry_extract(root: Node<'_, '_>) -> bool {
    xml::descendant(root, "СвЮЛ").is_some()
}

fn is_subdivision_record(root: Node<'_, '_>) -> bool {
    xml::descendant(root, "СвУчОргМН").is_some()
}

fn is_payment_confirmation(root: Node<'_, '_>) -> bool {
    xml::descendant(root, "PaymentInfo").is_some()
}

fn is_cadastral_extract(root: Node<'_, '_>) -> bool {
    root.first_element_child().is_some_and(|el| {
        let name = el.tag_name().name();
        name == "ReestrExtract" || name.starts_with("extract_about_property")
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testdata;
    use rstest::rstest;

    fn doc(filename: &str, xml: &str) -> RawDocument {
        RawDocument::new(filename, xml.as_bytes())
    }

    #[rstest]
    #[case(testdata::APPLICATION_FILE, DocumentKind::Application)]
    #[case("ДОВЕРЕННОСТЬ на представителя.xml", DocumentKind::PowerOfAttorney)]
    #[case(testdata::CADASTRAL_FILE, DocumentKind::CadastralExtract)]
    #[case(testdata::REGISTRY_FILE, DocumentKind::CompanyRegistry)]
    #[case(testdata::DUTY_FILE, DocumentKind::DutyPayment)]
    #[case("РНиП. Сведения о штрафах.xml", DocumentKind::FinesRecord)]
    #[case(testdata::TAX_DEBT_FILE, DocumentKind::TaxDebt)]
    #[case("Сведения о КПП подразделения.XML", DocumentKind::SubdivisionTax)]
    fn real_world_filenames(#[case] filename: &str, #[case] expected: DocumentKind) {
        assert_eq!(classify_filename(filename), Some(expected));
    }

    #[test]
    fn every_pattern_maps_to_its_kind() {
        for pattern in FILENAME_PATTERNS {
            let filename = format!("_{}_.XML", pattern.fragments.join(" - ").to_uppercase());
            assert_eq!(
                classify_filename(&filename),
                Some(pattern.kind),
                "pattern {:?}",
                pattern.fragments
            );
        }
    }

    #[test]
    fn unrelated_filename_is_inconclusive() {
        assert_eq!(classify_filename("scan_0001.xml"), None);
        assert_eq!(classify_filename("ФНС справка.xml"), None);
    }

    #[rstest]
    #[case(testdata::application("7701234567", "772501001", "77:05:0001005:1234"), DocumentKind::Application)]
    #[case(testdata::tax_debt("0"), DocumentKind::TaxDebt)]
    #[case(testdata::company_registry("7701234567"), DocumentKind::CompanyRegistry)]
    #[case(r#"<Файл><Документ><СвУчОргМН КПП="772501001"/></Документ></Файл>"#.to_string(), DocumentKind::SubdivisionTax)]
    #[case(testdata::duty_payment("6500000"), DocumentKind::DutyPayment)]
    #[case(testdata::cadastral("77:05:0001005:1234"), DocumentKind::CadastralExtract)]
    #[case("<ReestrExtract><cad_number>1</cad_number></ReestrExtract>".to_string(), DocumentKind::CadastralExtract)]
    fn content_predicates(#[case] xml: String, #[case] expected: DocumentKind) {
        let classified = classify(&doc("upload_17.xml", &xml));
        assert_eq!(
            classified.result,
            ClassificationResult::Known {
                kind: expected,
                source: ConfidenceSource::Content
            }
        );
        assert!(classified.diagnostic.is_none());
    }

    #[test]
    fn filename_takes_priority_over_content() {
        let classified = classify(&doc(
            testdata::APPLICATION_FILE,
            &testdata::company_registry("7701234567"),
        ));
        assert_eq!(
            classified.result,
            ClassificationResult::Known {
                kind: DocumentKind::Application,
                source: ConfidenceSource::Filename
            }
        );
    }

    #[test]
    fn application_namespace_is_required() {
        let xml = "<Request><BaseDeclarant><Inn>1</Inn></BaseDeclarant></Request>";
        assert_eq!(classify(&doc("upload.xml", xml)).result, ClassificationResult::Unknown);
    }

    #[test]
    fn debt_title_must_mention_debt() {
        let xml = "<Файл><ЗагДок>Сведения о доходах</ЗагДок></Файл>";
        assert_eq!(classify(&doc("upload.xml", xml)).result, ClassificationResult::Unknown);
    }

    #[test]
    fn malformed_xml_is_unknown_even_with_known_filename() {
        let classified = classify(&doc(testdata::REGISTRY_FILE, "<Файл><СвЮЛ></Файл>"));
        assert_eq!(classified.result, ClassificationResult::Unknown);
        assert!(matches!(classified.diagnostic, Some(XmlError::Syntax(_))));
    }

    #[test]
    fn non_utf8_is_unknown() {
        let raw = RawDocument::new("cp1251.xml", vec![b'<', b'a', b'>', 0xC0, b'<', b'/', b'a', b'>']);
        let classified = classify(&raw);
        assert_eq!(classified.result, ClassificationResult::Unknown);
        assert!(matches!(classified.diagnostic, Some(XmlError::Encoding(_))));
    }

    #[test]
    fn declared_windows_1251_is_classified_by_content() {
        let xml = r#"<?xml version="1.0" encoding="windows-1251"?>
<Файл><Документ><ЗагДок>Сведения о наличии задолженности</ЗагДок></Документ></Файл>"#;
        let raw = RawDocument::new("upload.xml", encoding_rs::WINDOWS_1251.encode(xml).0.into_owned());
        let classified = classify(&raw);
        assert_eq!(
            classified.result,
            ClassificationResult::Known {
                kind: DocumentKind::TaxDebt,
                source: ConfidenceSource::Content
            }
        );
        assert!(classified.diagnostic.is_none());
    }
}
