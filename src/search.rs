//! Greedy word-association race over linked pages.
//!
//! Each step fetches the current page, keeps the internal links whose text is a
//! known word, drops words already chosen and blacklisted ones, and follows the
//! link whose word is closest to the target. The race ends when the target word
//! itself is among the links (`Found`), when no candidate remains (`Stuck`), or
//! when the step budget runs out (`StepLimit`).

use crate::embedding::{rank_distance, EmbeddingTable};
use crate::error::RaceError;
use crate::page::PageSource;

use std::cmp::Ordering;
use tracing::{debug, info};

/// Navigation chrome that is never article content.
pub const BLACKLIST: [&str; 2] = ["edit", "^"];
pub const DEFAULT_MAX_STEPS: usize = 100;

/// One visited page and the word chosen on it.
#[derive(Clone, Debug, PartialEq)]
pub struct Step {
    pub page_title: String,
    pub reference: String,
    pub word: String,
    pub distance: f32,
}

#[derive(Clone, Debug, PartialEq)]
pub enum Traversal {
    /// `path` ends with the target word, `final_page` is where its link points.
    Found { path: Vec<String>, final_page: String, steps: Vec<Step> },
    Stuck { path: Vec<String>, steps: Vec<Step> },
    StepLimit { path: Vec<String>, steps: Vec<Step> },
}

impl Traversal {
    pub fn path(&self) -> &[String] {
        match self {
            Traversal::Found { path, .. } | Traversal::Stuck { path, .. } | Traversal::StepLimit { path, .. } => path
        }
    }

    pub fn steps(&self) -> &[Step] {
        match self {
            Traversal::Found { steps, .. } | Traversal::Stuck { steps, .. } | Traversal::StepLimit { steps, .. } => steps
        }
    }
}

pub struct GreedyLinkSearch<'a, P: PageSource> {
    table: &'a EmbeddingTable,
    pages: P,
    blacklist: Vec<String>,
    max_steps: usize,
}

impl<'a, P: PageSource> GreedyLinkSearch<'a, P> {

    pub fn new(table: &'a EmbeddingTable, pages: P) -> GreedyLinkSearch<'a, P> {
        Self {
            table: table,
            pages: pages,
            blacklist: BLACKLIST.iter().map(|w| w.to_string()).collect(),
            max_steps: DEFAULT_MAX_STEPS
        }
    }

    pub fn with_blacklist(mut self, blacklist: Vec<String>) -> Self {
        self.blacklist = blacklist;
        self
    }

    /// Upper bound on the number of words chosen before giving up.
    pub fn with_max_steps(mut self, max_steps: usize) -> Self {
        self.max_steps = max_steps;
        self
    }

    pub fn run(&self, start: &str, target_word: &str) -> Result<Traversal, RaceError> {

        if !self.table.contains(target_word) {
            return Err(RaceError::WordNotFound(target_word.to_owned()));
        }

        let mut history: Vec<String> = Vec::new();
        let mut steps: Vec<Step> = Vec::new();
        let mut reference = start.to_owned();

        loop {

            let page = self.pages.fetch_and_extract_links(&reference)?;
            if steps.is_empty() {
                info!("{} => {}... RACE!", page.title, target_word);
            }
            info!("{} =>", page.title);

            // internal links only, keep page order for resolving the chosen word
            let links = page
            .links
            .iter()
            .filter(|link| link.is_internal)
            .map(|link| (link.text.to_lowercase(), link.href.as_str()))
            .collect::<Vec<(String, &str)>>();

            let link_words = links.iter().map(|(text, _)| text.as_str()).collect::<Vec<&str>>();
            let mut present = self.table.filter_present(&link_words);
            present.retain(|word| !history.contains(word) && !self.blacklist.contains(word));
            debug!("{}/{} link words present", present.len(), link_words.len());

            if present.contains(target_word) {
                info!("{}", target_word);
                let final_page = self.follow(&links, target_word)?;
                history.push(target_word.to_owned());
                return Ok(Traversal::Found { path: history, final_page: final_page, steps: steps });
            }

            if present.is_empty() {
                info!("no viable link left");
                return Ok(Traversal::Stuck { path: history, steps: steps });
            }

            if history.len() >= self.max_steps {
                info!("gave up after {} steps", history.len());
                return Ok(Traversal::StepLimit { path: history, steps: steps });
            }

            // present iterates in lexicographic order, strict `<` keeps the first minimum
            let mut closest: Option<(&String, f32)> = None;
            for word in &present {
                let dist = self.table.distance(word, target_word)?;
                debug!("{} -> {}: {}", word, target_word, dist);
                let closer = match closest {
                    Some((_, best)) => rank_distance(dist, best) == Ordering::Less,
                    None => true
                };
                if closer {
                    closest = Some((word, dist));
                }
            }

            let (word, dist) = match closest {
                Some((word, dist)) => (word.to_owned(), dist),
                None => return Ok(Traversal::Stuck { path: history, steps: steps })
            };

            info!("-> {} ({})", word, dist);
            let next = self.follow(&links, &word)?;
            steps.push(Step {
                page_title: page.title,
                reference: reference,
                word: word.clone(),
                distance: dist
            });
            history.push(word);
            reference = next;
        }
    }

    /// Resolves the first link on the page whose text is `word`.
    fn follow(&self, links: &[(String, &str)], word: &str) -> Result<String, RaceError> {
        match links.iter().find(|(text, _)| text == word) {
            Some((_, href)) => self.pages.resolve(href),
            None => Err(RaceError::WordNotFound(word.to_owned()))
        }
    }
}


#[cfg(test)]
mod tests {

    use super::*;
    use crate::page::{Link, Page};
    use std::cell::RefCell;
    use std::collections::HashMap;
    use std::io::Cursor;
    use ndarray::array;
    use ndarray_npy::write_npy;

    /// Pages keyed by reference, recording every fetch.
    #[derive(Default)]
    struct MemoryPages {
        pages: HashMap<String, Page>,
        fetched: RefCell<Vec<String>>,
    }

    impl MemoryPages {
        fn page(mut self, reference: &str, links: &[(&str, &str)]) -> Self {
            let links = links.iter().map(|(text, href)| Link::new(text, href, href.starts_with('/'))).collect();
            self.pages.insert(reference.to_owned(), Page { title: reference.trim_start_matches('/').to_owned(), links: links });
            self
        }
    }

    impl PageSource for MemoryPages {
        fn fetch_and_extract_links(&self, reference: &str) -> Result<Page, RaceError> {
            self.fetched.borrow_mut().push(reference.to_owned());
            self.pages.get(reference).cloned().ok_or_else(|| RaceError::Fetch {
                reference: reference.to_owned(),
                reason: "404".to_owned()
            })
        }
    }

    fn table(text: &str) -> EmbeddingTable {
        EmbeddingTable::load(Cursor::new(text)).unwrap()
    }

    #[test]
    fn fruit_then_apple() {
        let table = table("apple 0 0\nfruit 1 0\nedit 0 0\n");
        let pages = MemoryPages::default()
        .page("/page1", &[("Fruit", "/page2"), ("edit", "/page1")])
        .page("/page2", &[("Apple", "/page3")]);

        let result = GreedyLinkSearch::new(&table, &pages).run("/page1", "apple").unwrap();
        match result {
            Traversal::Found { path, final_page, steps } => {
                assert_eq!(path, vec!["fruit", "apple"]);
                assert_eq!(final_page, "/page3");
                assert_eq!(steps.len(), 1);
                assert_eq!(steps[0].word, "fruit");
                assert_eq!(steps[0].distance, 1.0);
                assert_eq!(steps[0].reference, "/page1");
            },
            other => panic!("expected found, got {:?}", other)
        }
        // the answer page itself is never fetched
        assert_eq!(*pages.fetched.borrow(), vec!["/page1", "/page2"]);
    }

    #[test]
    fn stuck_without_candidates() {
        let table = table("apple 0 0\nedit 0 0\n");
        let pages = MemoryPages::default().page("/p", &[("edit", "/p"), ("unknown", "/q"), ("^", "/r")]);

        let result = GreedyLinkSearch::new(&table, &pages).run("/p", "apple").unwrap();
        assert_eq!(result, Traversal::Stuck { path: vec![], steps: vec![] });
    }

    #[test]
    fn external_links_are_ignored() {
        let table = table("apple 0 0\nfruit 1 0\n");
        let pages = MemoryPages::default().page("/p", &[("apple", "https://elsewhere.org/apple"), ("fruit", "/q")])
        .page("/q", &[]);

        let result = GreedyLinkSearch::new(&table, &pages).run("/p", "apple").unwrap();
        assert_eq!(result.path(), ["fruit"]);
        assert!(matches!(result, Traversal::Stuck { .. }));
    }

    #[test]
    fn blacklisted_target_is_never_found() {
        let table = table("edit 0 0\nfruit 1 0\n");
        let pages = MemoryPages::default().page("/p", &[("edit", "/e"), ("fruit", "/q")]).page("/q", &[("edit", "/e")]);

        let result = GreedyLinkSearch::new(&table, &pages).run("/p", "edit").unwrap();
        assert!(matches!(result, Traversal::Stuck { ref path, .. } if path == &["fruit"]));
    }

    #[test]
    fn history_words_are_not_revisited() {
        // a and b link to each other, the race must not bounce back
        let table = table("target 0 0\na 1 0\nb 2 0\nc 5 0\n");
        let pages = MemoryPages::default()
        .page("/a", &[("b", "/b"), ("c", "/c")])
        .page("/b", &[("a", "/a"), ("b", "/b"), ("c", "/c")])
        .page("/c", &[("a", "/a"), ("b", "/b")]);

        let result = GreedyLinkSearch::new(&table, &pages).run("/a", "target").unwrap();
        let path = result.path().to_vec();
        assert_eq!(path, vec!["b", "a", "c"]);
        let mut dedup = path.clone();
        dedup.sort();
        dedup.dedup();
        assert_eq!(dedup.len(), path.len());
        assert!(matches!(result, Traversal::Stuck { .. }));
    }

    #[test]
    fn ties_break_lexicographically() {
        let table = table("t 0 0\nzeta 1 0\nalpha 0 1\nmid 0 -1\n");
        let pages = MemoryPages::default()
        .page("/p", &[("Zeta", "/z"), ("Mid", "/m"), ("Alpha", "/a")])
        .page("/a", &[]);

        let result = GreedyLinkSearch::new(&table, &pages).run("/p", "t").unwrap();
        assert_eq!(result.path(), ["alpha"]);
    }

    #[test]
    fn follows_first_matching_link() {
        let table = table("t 0 0\nx 1 0\n");
        let pages = MemoryPages::default()
        .page("/p", &[("X", "/first"), ("x", "/second")])
        .page("/first", &[("t", "/done")]);

        let result = GreedyLinkSearch::new(&table, &pages).run("/p", "t").unwrap();
        assert!(matches!(result, Traversal::Found { ref final_page, .. } if final_page == "/done"));
    }

    #[test]
    fn reaches_target_after_k_steps() {
        // chain /0 -> /1 -> ... -> /5 with words closing in on the target
        let table = table("target 0\nw0 6\nw1 5\nw2 4\nw3 3\nw4 2\nfar 50\n");
        let mut pages = MemoryPages::default();
        for i in 0..5 {
            let next = format!("/{}", i + 1);
            let word = format!("w{}", i);
            pages = pages.page(&format!("/{}", i), &[("far", "/far"), (word.as_str(), next.as_str())]);
        }
        pages = pages.page("/5", &[("target", "/end")]);

        let result = GreedyLinkSearch::new(&table, &pages).run("/0", "target").unwrap();
        match result {
            Traversal::Found { path, steps, .. } => {
                assert_eq!(steps.len(), 5);
                assert_eq!(path, vec!["w0", "w1", "w2", "w3", "w4", "target"]);
                let dists = steps.iter().map(|s| s.distance).collect::<Vec<f32>>();
                assert_eq!(dists, vec![6.0f32, 5.0, 4.0, 3.0, 2.0]);
            },
            other => panic!("expected found, got {:?}", other)
        }
    }

    #[test]
    fn step_limit_stops_endless_race() {
        let table = table("t 0\na 1\nb 2\nc 3\nd 4\n");
        let pages = MemoryPages::default()
        .page("/p", &[("a", "/p"), ("b", "/p"), ("c", "/p"), ("d", "/p")]);

        let result = GreedyLinkSearch::new(&table, &pages).with_max_steps(2).run("/p", "t").unwrap();
        assert!(matches!(result, Traversal::StepLimit { ref path, .. } if path == &["a", "b"]));
        assert_eq!(result.steps().len(), 2);
        assert_eq!(pages.fetched.borrow().len(), 3);
    }

    #[test]
    fn stuck_wins_over_spent_budget() {
        let table = table("t 0\na 1\nedit 2\n");
        let pages = MemoryPages::default().page("/p", &[("a", "/q")]).page("/q", &[]).page("/e", &[("edit", "/e")]);

        let result = GreedyLinkSearch::new(&table, &pages).with_max_steps(1).run("/p", "t").unwrap();
        assert!(matches!(result, Traversal::Stuck { ref path, .. } if path == &["a"]));

        let result = GreedyLinkSearch::new(&table, &pages).with_max_steps(0).run("/e", "t").unwrap();
        assert_eq!(result, Traversal::Stuck { path: vec![], steps: vec![] });
    }

    #[test]
    fn nan_distance_is_never_closest() {
        // text tables refuse nan, a trained matrix can still carry one
        let dir = tempfile::tempdir().unwrap();
        let vecs_path = dir.path().join("vecs.npy");
        let words_path = dir.path().join("words.txt");
        write_npy(&vecs_path, &array![[0.0f32], [-f32::NAN], [1.0]]).unwrap();
        std::fs::write(&words_path, r#"{"t": 0, "bad": 1, "good": 2}"#).unwrap();
        let table = EmbeddingTable::from_npy(&vecs_path, &words_path).unwrap();

        let pages = MemoryPages::default().page("/p", &[("bad", "/b"), ("good", "/g")]).page("/g", &[]);
        let result = GreedyLinkSearch::new(&table, &pages).run("/p", "t").unwrap();
        assert_eq!(result.path(), ["good"]);
    }

    #[test]
    fn unknown_target_fails_fast() {
        let table = table("a 1\n");
        let pages = MemoryPages::default();
        assert!(matches!(GreedyLinkSearch::new(&table, &pages).run("/p", "zzz"), Err(RaceError::WordNotFound(_))));
        assert!(pages.fetched.borrow().is_empty());
    }

    #[test]
    fn fetch_errors_propagate() {
        let table = table("t 0\na 1\n");
        let pages = MemoryPages::default().page("/p", &[("a", "/missing")]);

        let err = GreedyLinkSearch::new(&table, &pages).run("/p", "t").unwrap_err();
        assert!(matches!(err, RaceError::Fetch { ref reference, .. } if reference == "/missing"));
    }
}
