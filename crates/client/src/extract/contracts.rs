//! Contract extraction from the contracts list page.
//!
//! Open contracts are rendered as green action buttons:
//!
//! ```html
//! <a class="btn btn-success" href="/contrat/12">
//!   Légumes été 2024 <small>jusqu'au 12/05</small>
//! </a>
//! ```

use scraper::{Html, Selector};

use super::{spaced_text_excluding, stripped_text};
use crate::fetch::SiteUrls;
use amap_core::{Contract, ContractSnapshot};

/// Every open contract on the page, in document order.
///
/// A page without any contract button yields an empty list.
pub fn extract_contracts(html: &str, urls: &SiteUrls) -> ContractSnapshot {
    let document = Html::parse_document(html);
    let link_sel = Selector::parse("a.btn-success").expect("invalid selector");
    let small_sel = Selector::parse("small").expect("invalid selector");

    let contracts: ContractSnapshot = document
        .select(&link_sel)
        .map(|link| {
            let small = link.select(&small_sel).next();
            let deadline = small.as_ref().map(stripped_text).unwrap_or_default();
            let title = spaced_text_excluding(&link, small.as_ref());
            let url = link.value().attr("href").map(|href| urls.absolutize(href)).unwrap_or_default();
            Contract { title, deadline, url }
        })
        .collect();

    tracing::debug!(count = contracts.len(), "parsed contracts list");
    contracts
}

#[cfg(test)]
mod tests {
    use super::*;

    fn urls() -> SiteUrls {
        SiteUrls::new("https://amap.test").unwrap()
    }

    #[test]
    fn test_extract_contracts_basic() {
        let html = r#"
            <html><body>
                <a class="btn btn-success" href="/contrat/12">
                    Légumes été 2024
                    <small>jusqu'au 12/05</small>
                </a>
                <a class="btn btn-success" href="https://ailleurs.test/contrat/7">Pain <b>bio</b></a>
            </body></html>
        "#;

        let contracts = extract_contracts(html, &urls());
        assert_eq!(
            contracts,
            vec![
                Contract {
                    title: "Légumes été 2024".into(),
                    deadline: "jusqu'au 12/05".into(),
                    url: "https://amap.test/contrat/12".into(),
                },
                Contract {
                    title: "Pain bio".into(),
                    deadline: String::new(),
                    url: "https://ailleurs.test/contrat/7".into(),
                },
            ]
        );
    }

    #[test]
    fn test_relative_href_without_slash() {
        let html = r#"<a class="btn-success" href="contrat/3">Miel</a>"#;
        let contracts = extract_contracts(html, &urls());
        assert_eq!(contracts[0].url, "https://amap.test/contrat/3");
    }

    #[test]
    fn test_missing_href_gives_empty_url() {
        let html = r#"<a class="btn-success">Fromage</a>"#;
        let contracts = extract_contracts(html, &urls());
        assert_eq!(contracts[0].url, "");
        assert_eq!(contracts[0].title, "Fromage");
    }

    #[test]
    fn test_only_success_buttons() {
        let html = r#"
            <a class="btn btn-default" href="/contrat/1">Fermé</a>
            <a class="btn btn-success" href="/contrat/2">Ouvert</a>
            <span class="btn-success">pas un lien</span>
        "#;
        let contracts = extract_contracts(html, &urls());
        assert_eq!(contracts.len(), 1);
        assert_eq!(contracts[0].title, "Ouvert");
    }

    #[test]
    fn test_only_first_small_is_deadline() {
        let html = r#"<a class="btn-success" href="/c/1">Volailles <small>avant le 01/06</small> <small>(2 places)</small></a>"#;
        let contracts = extract_contracts(html, &urls());
        assert_eq!(contracts[0].deadline, "avant le 01/06");
        assert_eq!(contracts[0].title, "Volailles (2 places)");
    }

    #[test]
    fn test_no_contracts_is_empty_list() {
        let html = "<html><body><p>Aucun contrat pour le moment.</p></body></html>";
        assert!(extract_contracts(html, &urls()).is_empty());
    }

    #[test]
    fn test_extraction_does_not_alter_document_order() {
        let html = r#"
            <a class="btn-success" href="/c/b">B <small>d1</small></a>
            <a class="btn-success" href="/c/a">A <small>d2</small></a>
        "#;
        let first = extract_contracts(html, &urls());
        let second = extract_contracts(html, &urls());
        assert_eq!(first, second);
        assert_eq!(first[0].title, "B");
        assert_eq!(first[1].deadline, "d2");
    }
}
