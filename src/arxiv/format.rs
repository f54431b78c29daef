use super::types::PaperRecord;
use crate::markdown::{escape_md_link, sanitize_heading};

const MAX_LISTED_AUTHORS: usize = 5;

fn format_authors(authors: &[String]) -> String {
    match authors.len() {
        0 => "Unknown authors".to_string(),
        n if n > MAX_LISTED_AUTHORS => {
            let listed = authors[..MAX_LISTED_AUTHORS].join(", ");
            format!("{listed} et al.")
        }
        _ => authors.join(", "),
    }
}

/// Format ranked papers as a Markdown list (search-only mode).
pub fn format_paper_list(topic: &str, papers: &[PaperRecord]) -> String {
    let mut out = format!("# arXiv: {}\n\n", sanitize_heading(topic));

    if papers.is_empty() {
        out.push_str("No papers found.\n");
        return out;
    }

    for (rank, paper) in papers.iter().enumerate() {
        out.push_str(&format!(
            "{}. [{}]({}) ({})\n   {}\n",
            rank + 1,
            escape_md_link(&paper.title),
            escape_md_link(&paper.pdf_url),
            paper.published_date.format("%Y-%m-%d"),
            format_authors(&paper.authors),
        ));
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn paper(title: &str, authors: &[&str]) -> PaperRecord {
        PaperRecord {
            title: title.into(),
            authors: authors.iter().map(|a| a.to_string()).collect(),
            published_date: NaiveDate::from_ymd_opt(2023, 5, 1).unwrap(),
            summary: "An abstract.".into(),
            pdf_url: "http://arxiv.org/pdf/2305.00001v1".into(),
        }
    }

    #[test]
    fn lists_papers_with_rank_and_link() {
        let papers = vec![paper("First", &["A"]), paper("Second (v2)", &["B", "C"])];
        let text = format_paper_list("graph\nneural", &papers);

        assert!(text.starts_with("# arXiv: graph neural\n"));
        assert!(text.contains("1. [First](http://arxiv.org/pdf/2305.00001v1) (2023-05-01)"));
        assert!(text.contains(r"2. [Second \(v2\)]"));
        assert!(text.contains("   B, C\n"));
    }

    #[test]
    fn long_author_lists_are_abbreviated() {
        let names = ["A", "B", "C", "D", "E", "F", "G"];
        let text = format_paper_list("t", &[paper("P", &names)]);
        assert!(text.contains("A, B, C, D, E et al."));
        assert!(!text.contains("F"));
    }

    #[test]
    fn empty_result_says_so() {
        let text = format_paper_list("t", &[]);
        assert!(text.contains("No papers found."));
    }

    #[test]
    fn missing_authors_are_labelled() {
        let text = format_paper_list("t", &[paper("P", &[])]);
        assert!(text.contains("Unknown authors"));
    }
}
