//! Typed field extraction, one branch per document kind.
//!
//! Missing optional elements and attributes become `None` fields. Only the
//! absence of a kind's anchor element (the block the record is read from)
//! fails the extraction.

use licenzia_core::{
    Amount, ApplicationRecord, CadastralRecord, CompanyRegistryRecord, CompanyStatus,
    DeclaredObject, DocumentKind, DutyPaymentRecord, ExtractedRecord, TaxDebtRecord,
};
use roxmltree::{Document, Node};
use thiserror::Error;
use tracing::{debug, warn};

use crate::xml::{self, APPLICATION_NS};

/// Currency of domestic state duties when the export does not say.
const DEFAULT_CURRENCY: &str = "RUB";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ExtractionError {
    #[error("{kind}: required element <{element}> not found")]
    MissingAnchor {
        kind: DocumentKind,
        element: &'static str,
    },
}

/// Extract the record for `kind` from a parsed document.
///
/// Kinds that are recognised but carry no fields the rules use yield
/// `Ok(None)`.
pub fn extract(
    kind: DocumentKind,
    tree: &Document<'_>,
) -> Result<Option<ExtractedRecord>, ExtractionError> {
    let root = tree.root();
    let record = match kind {
        DocumentKind::Application => ExtractedRecord::Application(application(root)?),
        DocumentKind::CompanyRegistry => ExtractedRecord::CompanyRegistry(company_registry(root)?),
        DocumentKind::TaxDebt => ExtractedRecord::TaxDebt(tax_debt(root)?),
        DocumentKind::DutyPayment => ExtractedRecord::DutyPayment(duty_payment(root)?),
        DocumentKind::CadastralExtract => ExtractedRecord::CadastralExtract(cadastral(root)?),
        DocumentKind::PowerOfAttorney | DocumentKind::FinesRecord | DocumentKind::SubdivisionTax => {
            debug!(%kind, "no fields extracted for kind");
            return Ok(None);
        }
    };
    Ok(Some(record))
}

fn missing(kind: DocumentKind, element: &'static str) -> ExtractionError {
    ExtractionError::MissingAnchor { kind, element }
}

fn application(root: Node<'_, '_>) -> Result<ApplicationRecord, ExtractionError> {
    let declarant = xml::descendant_ns(root, APPLICATION_NS, "BaseDeclarant")
        .ok_or_else(|| missing(DocumentKind::Application, "BaseDeclarant"))?;

    let declared_objects = root
        .descendants()
        .filter(|n| xml::is_local(n, "separate_division"))
        .map(declared_object)
        .collect();

    Ok(ApplicationRecord {
        tax_id: xml::child_text_ns(declarant, APPLICATION_NS, "Inn"),
        subdivision_code: xml::child_text_ns(declarant, APPLICATION_NS, "Kpp"),
        company_name: xml::child_text_ns(declarant, APPLICATION_NS, "FullName"),
        declared_objects,
    })
}

fn declared_object(division: Node<'_, '_>) -> DeclaredObject {
    DeclaredObject {
        // Postal-box form first, street form otherwise.
        address: xml::descendant_text(division, "pobox")
            .or_else(|| xml::descendant_text(division, "street")),
        cadastral_number: xml::descendant_text(division, "cadastral_number"),
        unit_name: xml::descendant_text(division, "name_unit"),
    }
}

fn company_registry(root: Node<'_, '_>) -> Result<CompanyRegistryRecord, ExtractionError> {
    let entity = xml::descendant(root, "СвЮЛ")
        .ok_or_else(|| missing(DocumentKind::CompanyRegistry, "СвЮЛ"))?;

    let company_name =
        xml::descendant(root, "СвНаимЮЛ").and_then(|n| xml::attr(n, "НаимЮЛПолн"));

    // A termination block means the entity has been struck off.
    let status = if xml::descendant(entity, "СвПрекрЮЛ").is_some() {
        CompanyStatus::Terminated
    } else {
        CompanyStatus::Active
    };

    Ok(CompanyRegistryRecord {
        tax_id: xml::attr(entity, "ИНН"),
        subdivision_code: xml::attr(entity, "КПП"),
        company_name,
        status,
    })
}

fn tax_debt(root: Node<'_, '_>) -> Result<TaxDebtRecord, ExtractionError> {
    let response = xml::descendant(root, "INFZDLResponse")
        .ok_or_else(|| missing(DocumentKind::TaxDebt, "INFZDLResponse"))?;

    // "0" is the only value certifying the absence of debt.
    let has_debt_over_threshold = xml::attr(response, "ПрЗадолж").is_none_or(|flag| flag != "0");

    Ok(TaxDebtRecord {
        has_debt_over_threshold,
    })
}

fn duty_payment(root: Node<'_, '_>) -> Result<DutyPaymentRecord, ExtractionError> {
    let payment = xml::descendant(root, "PaymentInfo")
        .ok_or_else(|| missing(DocumentKind::DutyPayment, "PaymentInfo"))?;

    let amount = match xml::attr(payment, "amount") {
        Some(raw) => {
            let parsed = Amount::parse_minor(&raw);
            if parsed.is_none() {
                warn!(raw = %raw, "payment amount is not an integer count of kopecks");
            }
            parsed
        }
        None => None,
    };

    Ok(DutyPaymentRecord {
        amount,
        currency: xml::attr(payment, "currency").unwrap_or_else(|| DEFAULT_CURRENCY.to_string()),
    })
}

fn cadastral(root: Node<'_, '_>) -> Result<CadastralRecord, ExtractionError> {
    let cadastral_number = xml::descendant_text(root, "cad_number")
        .ok_or_else(|| missing(DocumentKind::CadastralExtract, "cad_number"))?;

    Ok(CadastralRecord {
        cadastral_number,
        area: xml::descendant_text(root, "area"),
        purpose: xml::descendant(root, "purpose").and_then(|p| xml::descendant_text(p, "value")),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testdata;
    use pretty_assertions::assert_eq;

    fn run(kind: DocumentKind, xml: &str) -> Result<Option<ExtractedRecord>, ExtractionError> {
        let tree = xml::parse(xml).unwrap();
        extract(kind, &tree)
    }

    fn duty_amount(minor: &str) -> Option<Amount> {
        match run(DocumentKind::DutyPayment, &testdata::duty_payment(minor)) {
            Ok(Some(ExtractedRecord::DutyPayment(r))) => r.amount,
            other => panic!("unexpected extraction result: {other:?}"),
        }
    }

    #[test]
    fn application_fields_and_objects() {
        let xml = testdata::application("7701234567", "772501001", "77:05:0001005:1234");
        let Ok(Some(ExtractedRecord::Application(app))) = run(DocumentKind::Application, &xml)
        else {
            panic!("application not extracted");
        };

        assert_eq!(app.tax_id.as_deref(), Some("7701234567"));
        assert_eq!(app.subdivision_code.as_deref(), Some("772501001"));
        assert_eq!(app.company_name.as_deref(), Some("ООО \"Ромашка\""));
        assert_eq!(
            app.declared_objects,
            vec![
                DeclaredObject {
                    address: Some("г. Москва, ул. Автозаводская, д. 18".into()),
                    cadastral_number: Some("77:05:0001005:1234".into()),
                    unit_name: Some("Магазин у Автозаводской".into()),
                },
                DeclaredObject {
                    address: Some("ул. Складская, 3".into()),
                    cadastral_number: None,
                    unit_name: Some("Склад".into()),
                },
            ]
        );
    }

    #[test]
    fn application_without_declarant_fails() {
        let xml = r#"<r xmlns="http://asguf.mos.ru/rkis_gu/coordinate/v6_1/"><Other/></r>"#;
        assert_eq!(
            run(DocumentKind::Application, xml),
            Err(ExtractionError::MissingAnchor {
                kind: DocumentKind::Application,
                element: "BaseDeclarant"
            })
        );
    }

    #[test]
    fn application_missing_fields_are_none() {
        let xml = r#"<r xmlns:n="http://asguf.mos.ru/rkis_gu/coordinate/v6_1/"><n:BaseDeclarant/></r>"#;
        let Ok(Some(ExtractedRecord::Application(app))) = run(DocumentKind::Application, xml)
        else {
            panic!("application not extracted");
        };
        assert_eq!(app.tax_id, None);
        assert_eq!(app.subdivision_code, None);
        assert!(app.declared_objects.is_empty());
    }

    #[test]
    fn company_registry_attributes() {
        let Ok(Some(ExtractedRecord::CompanyRegistry(reg))) = run(
            DocumentKind::CompanyRegistry,
            &testdata::company_registry("7709999999"),
        ) else {
            panic!("registry not extracted");
        };
        assert_eq!(reg.tax_id.as_deref(), Some("7709999999"));
        assert_eq!(reg.subdivision_code.as_deref(), Some("772501001"));
        assert_eq!(
            reg.company_name.as_deref(),
            Some("ОБЩЕСТВО С ОГРАНИЧЕННОЙ ОТВЕТСТВЕННОСТЬЮ \"РОМАШКА\"")
        );
        assert_eq!(reg.status, CompanyStatus::Active);
    }

    #[test]
    fn terminated_company() {
        let xml = r#"<Файл><СвЮЛ ИНН="7701234567"><СвПрекрЮЛ ДатаПрекрЮЛ="2020-01-01"/></СвЮЛ></Файл>"#;
        let Ok(Some(ExtractedRecord::CompanyRegistry(reg))) =
            run(DocumentKind::CompanyRegistry, xml)
        else {
            panic!("registry not extracted");
        };
        assert_eq!(reg.status, CompanyStatus::Terminated);
        assert_eq!(reg.company_name, None);
    }

    #[test]
    fn tax_debt_flag() {
        let flag = |xml: String| match run(DocumentKind::TaxDebt, &xml) {
            Ok(Some(ExtractedRecord::TaxDebt(r))) => r.has_debt_over_threshold,
            other => panic!("unexpected: {other:?}"),
        };
        assert!(!flag(testdata::tax_debt("0")));
        assert!(flag(testdata::tax_debt("1")));
        assert!(flag("<Файл><INFZDLResponse/></Файл>".to_string()));
    }

    #[test]
    fn tax_debt_without_response_fails() {
        assert!(run(DocumentKind::TaxDebt, "<Файл><ЗагДок>задолженность</ЗагДок></Файл>").is_err());
    }

    #[test]
    fn duty_amount_converts_at_cent_boundary() {
        assert_eq!(duty_amount("6500000"), Some(Amount::from_major(65000)));
        assert_eq!(duty_amount("6500000").unwrap().to_string(), "65000.00");
        assert_eq!(duty_amount("6499999").unwrap().to_string(), "64999.99");
        assert_eq!(duty_amount("not-a-number"), None);
    }

    #[test]
    fn duty_currency_defaults_to_rub() {
        let Ok(Some(ExtractedRecord::DutyPayment(duty))) =
            run(DocumentKind::DutyPayment, "<r><PaymentInfo/></r>")
        else {
            panic!("duty not extracted");
        };
        assert_eq!(duty.amount, None);
        assert_eq!(duty.currency, "RUB");
    }

    #[test]
    fn cadastral_fields() {
        let Ok(Some(ExtractedRecord::CadastralExtract(cad))) = run(
            DocumentKind::CadastralExtract,
            &testdata::cadastral("77:05:0001005:1234"),
        ) else {
            panic!("cadastral not extracted");
        };
        assert_eq!(cad.cadastral_number, "77:05:0001005:1234");
        assert_eq!(cad.area.as_deref(), Some("120.5"));
        assert_eq!(cad.purpose.as_deref(), Some("Нежилое"));
    }

    #[test]
    fn kinds_without_fields_yield_nothing() {
        for kind in [
            DocumentKind::PowerOfAttorney,
            DocumentKind::FinesRecord,
            DocumentKind::SubdivisionTax,
        ] {
            assert_eq!(run(kind, "<anything/>"), Ok(None));
        }
    }
}
