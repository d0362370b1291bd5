//! Offering state machine
//!
//! Reads the tokens of one description and groups them into (terms × hours)
//! sets. A group closes, and is written through [`crate::writer::combine`],
//! when a term follows hours, when `Arrange` forces it, when a correction
//! empties a token, and at the end of the stream. Halting keywords stop the
//! token loop, but the pending group is still written.

pub mod accumulator;
pub mod topics;

pub use accumulator::{Accumulator, Category};

use thiserror::Error;

use crate::config::compile_time::description::{
    MAX_COMPOUND_DEPTH, MAX_TOKENS_PER_DESCRIPTION, MAX_TOPIC_SCAN_DEPTH,
};
use crate::corrections::CorrectionTable;
use crate::logging::codes;
use crate::model::{Course, Department, Hour, Season};
use crate::store::{CatalogStore, DescriptionContext, StoreError};
use crate::tokens::splitter::{self, SplitOutcome};
use crate::tokens::{tokenize, Classifier, ControlEffect, ControlKeyword, RawToken, TokenClass};
use crate::writer::{self, CombineStats};
use crate::{log_debug, log_warning};

/// Store failure inside the machine, split by whether anything was being written
#[derive(Debug, Error)]
pub enum MachineFault {
    #[error("Reference lookup failed: {0}")]
    Lookup(#[source] StoreError),

    #[error("Offering write failed: {0}")]
    Write(#[source] StoreError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MachineOptions {
    /// Year `All` and `summer` are relative to
    pub catalog_year: i32,
    pub topic_scan: bool,
    pub trace_tokens: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MachineOutcome {
    pub stats: CombineStats,
    /// Keyword that stopped the token loop
    pub halted_by: Option<ControlKeyword>,
    pub tokens_processed: usize,
    pub tokens_skipped: usize,
    /// Tokens past the per-description cap
    pub tokens_truncated: usize,
    pub flushes: usize,
    pub redirects: usize,
    /// Topic fragments run through a nested machine
    pub topic_fragments: usize,
}

impl MachineOutcome {
    fn absorb_nested(&mut self, nested: &MachineOutcome) {
        self.stats.absorb(&nested.stats);
        self.flushes += nested.flushes;
        self.redirects += nested.redirects;
        self.topic_fragments += 1;
    }
}

enum Flow {
    Continue,
    Halt(ControlKeyword),
}

pub struct OfferingMachine<'a, S: CatalogStore + ?Sized> {
    store: &'a S,
    corrections: &'a CorrectionTable,
    department: &'a Department,
    context: &'a DescriptionContext,
    /// Snippet stored on created offerings
    description: &'a str,
    options: MachineOptions,
    scan_depth: usize,

    course: Course,
    accumulator: Accumulator,
    outcome: MachineOutcome,
}

impl<'a, S> OfferingMachine<'a, S>
where
    S: CatalogStore + ?Sized,
{
    pub fn new(
        store: &'a S,
        corrections: &'a CorrectionTable,
        department: &'a Department,
        course: &Course,
        description: &'a str,
        context: &'a DescriptionContext,
        options: MachineOptions,
    ) -> Self {
        Self {
            store,
            corrections,
            department,
            context,
            description,
            options,
            scan_depth: 0,
            course: course.clone(),
            accumulator: Accumulator::new(),
            outcome: MachineOutcome::default(),
        }
    }

    /// Process the description given to [`OfferingMachine::new`]
    pub fn run(self) -> Result<MachineOutcome, MachineFault> {
        let text = self.description;
        self.run_on(text)
    }

    fn run_on(mut self, text: &str) -> Result<MachineOutcome, MachineFault> {
        let tokens = tokenize(text);

        if tokens.len() > MAX_TOKENS_PER_DESCRIPTION {
            self.outcome.tokens_truncated = tokens.len() - MAX_TOKENS_PER_DESCRIPTION;
            log_warning!(
                code = codes::classification::TOKEN_LIMIT_EXCEEDED,
                "Description exceeds token limit, extra tokens ignored",
                "tokens" => tokens.len(),
                "limit" => MAX_TOKENS_PER_DESCRIPTION
            );
        }

        for token in tokens.iter().take(MAX_TOKENS_PER_DESCRIPTION) {
            if token.is_empty() {
                continue;
            }
            self.outcome.tokens_processed += 1;

            if let Flow::Halt(keyword) = self.step(token)? {
                log_debug!("Halted by keyword", "keyword" => keyword, "token" => token.raw);
                self.outcome.halted_by = Some(keyword);
                break;
            }
        }

        self.flush()?;
        Ok(self.outcome)
    }

    fn step(&mut self, token: &RawToken) -> Result<Flow, MachineFault> {
        let class = Classifier::new(self.store)
            .classify_prelude(token)
            .map_err(MachineFault::Lookup)?;
        self.trace(&token.cleaned, &class);

        match class {
            TokenClass::Control(keyword) => self.control(keyword),
            TokenClass::NeedsCorrection => {
                self.correct_and_accept(token)?;
                Ok(Flow::Continue)
            }
            other => {
                self.accept(other, 0)?;
                Ok(Flow::Continue)
            }
        }
    }

    fn control(&mut self, keyword: ControlKeyword) -> Result<Flow, MachineFault> {
        match keyword {
            ControlKeyword::All => self.add_all_terms()?,
            ControlKeyword::Summer => self.remove_summer_terms(),
            ControlKeyword::Arrange => {
                let arrange = self
                    .store
                    .lookup_hour(Hour::ARRANGE_PERIOD)
                    .map_err(MachineFault::Lookup)?;
                if let Some(hour) = arrange {
                    self.accumulator.accept_hour(hour);
                }
                self.flush()?;
            }
            ControlKeyword::Varies
                if self.options.topic_scan && self.scan_depth < MAX_TOPIC_SCAN_DEPTH =>
            {
                self.scan_topics()?
            }
            _ => {}
        }

        Ok(match keyword.effect() {
            ControlEffect::Halt => Flow::Halt(keyword),
            ControlEffect::Continue => Flow::Continue,
            ControlEffect::Skip => {
                self.outcome.tokens_skipped += 1;
                Flow::Continue
            }
        })
    }

    fn correct_and_accept(&mut self, token: &RawToken) -> Result<(), MachineFault> {
        let mut correction = self
            .corrections
            .apply(
                &self.department.abbreviation,
                &self.course,
                token,
                &mut self.accumulator,
                self.store,
            )
            .map_err(MachineFault::Lookup)?;

        if let Some(course) = correction.redirect.take() {
            log_debug!(
                "Active course redirected",
                "from" => self.course.label(),
                "to" => course.label()
            );
            self.course = course;
            self.outcome.redirects += 1;
        }

        if correction.is_discarded() {
            return self.flush();
        }

        let class = Classifier::new(self.store)
            .classify(&correction.token)
            .map_err(MachineFault::Lookup)?;
        self.trace(&correction.token, &class);
        self.accept(class, 0)
    }

    fn accept(&mut self, class: TokenClass, depth: usize) -> Result<(), MachineFault> {
        match class {
            TokenClass::Hour(hour) => self.accumulator.accept_hour(hour),
            TokenClass::Term(term) => {
                if self.accumulator.term_closes_group() {
                    self.flush()?;
                }
                self.accumulator.accept_term(term);
            }
            TokenClass::Compound(text) => {
                if depth >= MAX_COMPOUND_DEPTH {
                    log_warning!(
                        code = codes::classification::COMPOUND_DEPTH_EXCEEDED,
                        "Compound token nested too deeply, rest dropped",
                        "token" => text,
                        "limit" => MAX_COMPOUND_DEPTH
                    );
                    self.outcome.tokens_skipped += 1;
                    return Ok(());
                }

                // `13F,14W` after hours starts a new group, like a plain term would
                if self.accumulator.term_closes_group() && splitter::leads_with_term(&text) {
                    self.flush()?;
                }

                let classifier = Classifier::new(self.store);
                match splitter::split(&text, &mut self.accumulator, &classifier)
                    .map_err(MachineFault::Lookup)?
                {
                    SplitOutcome::Remainder(rest) => {
                        let class = classifier.classify(&rest).map_err(MachineFault::Lookup)?;
                        self.trace(&rest, &class);
                        self.accept(class, depth + 1)?;
                    }
                    SplitOutcome::Resolved(hour) => self.accumulator.accept_hour(hour),
                    SplitOutcome::Dropped => self.outcome.tokens_skipped += 1,
                }
            }
            TokenClass::Unrecognized | TokenClass::Control(_) | TokenClass::NeedsCorrection => {
                self.outcome.tokens_skipped += 1;
            }
        }
        Ok(())
    }

    /// Fall of the catalog year, then every known term of the next two years
    fn add_all_terms(&mut self) -> Result<(), MachineFault> {
        let year = self.options.catalog_year;

        let fall = self
            .store
            .lookup_term(year, Season::Fall)
            .map_err(MachineFault::Lookup)?;
        let following = self
            .store
            .terms_in_years(year + 1, year + 2)
            .map_err(MachineFault::Lookup)?;

        for term in fall.into_iter().chain(following) {
            self.accumulator.push_term(term);
        }
        self.accumulator.set_category(Category::Term);
        Ok(())
    }

    fn remove_summer_terms(&mut self) {
        let year = self.options.catalog_year;
        if self.accumulator.has_terms() {
            self.accumulator.remove_terms(|term| {
                term.season == Season::Summer && (term.year == year + 1 || term.year == year + 2)
            });
        }
        self.accumulator.set_category(Category::Term);
    }

    fn scan_topics(&mut self) -> Result<(), MachineFault> {
        let context = self.context;

        for fragment in topics::topic_fragments(context) {
            let nested = OfferingMachine {
                store: self.store,
                corrections: self.corrections,
                department: self.department,
                context,
                description: self.description,
                options: self.options,
                scan_depth: self.scan_depth + 1,
                course: self.course.clone(),
                accumulator: Accumulator::new(),
                outcome: MachineOutcome::default(),
            };
            let outcome = nested.run_on(fragment)?;
            self.outcome.absorb_nested(&outcome);
        }
        Ok(())
    }

    /// Close the current group. Groups with no complete pair are cleared without a write.
    fn flush(&mut self) -> Result<(), MachineFault> {
        let pending = std::mem::take(&mut self.accumulator);

        if pending.pair_count() == 0 {
            self.accumulator = Accumulator::after_flush(pending.category());
            return Ok(());
        }

        let (fresh, stats) = writer::combine(self.store, &self.course, pending, self.description)
            .map_err(MachineFault::Write)?;
        self.accumulator = fresh;
        self.outcome.stats.absorb(&stats);
        self.outcome.flushes += 1;
        Ok(())
    }

    fn trace(&self, token: &str, class: &TokenClass) {
        if self.options.trace_tokens {
            log_debug!(
                "Token classified",
                "token" => token,
                "class" => class.label(),
                "category" => self.accumulator.category().as_str()
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Offering, Term};
    use crate::store::{MemoryStore, ReferenceData};

    struct Fixture {
        store: MemoryStore,
        corrections: CorrectionTable,
        department: Department,
        course: Course,
    }

    impl Fixture {
        fn new() -> Self {
            let store = MemoryStore::with_default_vocabulary().unwrap();
            let course = store.add_course("COSC", "1", "Introduction to Programming").unwrap();
            Self {
                store,
                corrections: CorrectionTable::builtin(),
                department: Department::new("COSC", "Computer Science"),
                course,
            }
        }

        fn run_with(&self, text: &str, context: &DescriptionContext) -> MachineOutcome {
            let options = MachineOptions {
                catalog_year: 2013,
                topic_scan: true,
                trace_tokens: true,
            };
            OfferingMachine::new(
                &self.store,
                &self.corrections,
                &self.department,
                &self.course,
                text,
                context,
                options,
            )
            .run()
            .unwrap()
        }

        fn run(&self, text: &str) -> MachineOutcome {
            self.run_with(text, &DescriptionContext::for_year(2013))
        }

        fn pairs(&self) -> Vec<(String, String)> {
            let mut pairs: Vec<(String, String)> = self
                .store
                .offerings()
                .unwrap()
                .iter()
                .map(|o: &Offering| (o.term.to_string(), o.hour.to_string()))
                .collect();
            pairs.sort();
            pairs
        }
    }

    fn pairs(expected: &[(&str, &str)]) -> Vec<(String, String)> {
        let mut pairs: Vec<(String, String)> = expected
            .iter()
            .map(|(t, h)| (t.to_string(), h.to_string()))
            .collect();
        pairs.sort();
        pairs
    }

    #[test]
    fn test_single_group() {
        let fx = Fixture::new();
        let outcome = fx.run("13F, 14W: 9, 2");
        assert_eq!(outcome.stats.created, 4);
        assert_eq!(outcome.flushes, 1);
        assert_eq!(
            fx.pairs(),
            pairs(&[("13F", "9"), ("13F", "2"), ("14W", "9"), ("14W", "2")])
        );
    }

    #[test]
    fn test_term_after_hours_closes_group() {
        let fx = Fixture::new();
        let outcome = fx.run("13F: 9. 14W: 2");
        assert_eq!(outcome.flushes, 2);
        assert_eq!(fx.pairs(), pairs(&[("13F", "9"), ("14W", "2")]));
    }

    #[test]
    fn test_not_offered_halts() {
        let fx = Fixture::new();
        let outcome = fx.run("Not offered in the period from 13F through 15S");
        assert_eq!(outcome.halted_by, Some(ControlKeyword::Not));
        assert!(fx.pairs().is_empty());
    }

    #[test]
    fn test_halt_still_writes_pending_group() {
        let fx = Fixture::new();
        let outcome = fx.run("14S: 10A. See also COSC 2");
        assert_eq!(outcome.halted_by, Some(ControlKeyword::CrossReference));
        assert_eq!(fx.pairs(), pairs(&[("14S", "10A")]));
    }

    #[test]
    fn test_all_terms_except_summer() {
        let fx = Fixture::new();
        fx.run("All terms, except summer: 10");

        let terms: Vec<String> = fx.pairs().into_iter().map(|(t, _)| t).collect();
        assert_eq!(
            terms,
            vec!["13F", "14F", "14S", "14W", "15F", "15S", "15W"]
        );
        assert!(fx.pairs().iter().all(|(_, h)| h == "10"));
    }

    #[test]
    fn test_arrange_flushes_and_halts() {
        let fx = Fixture::new();
        let outcome = fx.run("14X: Arrange 15W: 10");
        assert_eq!(outcome.halted_by, Some(ControlKeyword::Arrange));
        assert_eq!(fx.pairs(), pairs(&[("14X", "Arrange")]));
    }

    #[test]
    fn test_times_vary_skips_times() {
        let fx = Fixture::new();
        let outcome = fx.run("13F: Times vary");
        assert_eq!(outcome.halted_by, Some(ControlKeyword::Varies));
        assert!(fx.pairs().is_empty());
    }

    #[test]
    fn test_topic_scan_runs_fragments() {
        let fx = Fixture::new();
        let context = DescriptionContext::for_year(2013)
            .with_fragment("Topic: Poetry. 13F at 10")
            .with_fragment("Topic: Drama. 14S at 2A");

        let outcome = fx.run_with("Offerings vary.", &context);

        assert_eq!(outcome.topic_fragments, 2);
        assert_eq!(fx.pairs(), pairs(&[("13F", "10"), ("14S", "2A")]));
    }

    #[test]
    fn test_compound_tokens() {
        let fx = Fixture::new();
        fx.run("14W:9L 13F,14S: 2");
        assert_eq!(
            fx.pairs(),
            pairs(&[("14W", "9L"), ("13F", "2"), ("14S", "2")])
        );
    }

    #[test]
    fn test_time_range_hour() {
        let fx = Fixture::new();
        fx.run("14S: 3:30-5:30");
        assert_eq!(fx.pairs(), pairs(&[("14S", "3:30-5:30")]));
        assert!(fx.store.lookup_hour("3:30-5:30").unwrap().is_some());
    }

    #[test]
    fn test_token_cap() {
        let fx = Fixture::new();
        let text = vec!["13F"; MAX_TOKENS_PER_DESCRIPTION + 3].join(" ");
        let outcome = fx.run(&text);
        assert_eq!(outcome.tokens_truncated, 3);
        assert_eq!(outcome.tokens_processed, MAX_TOKENS_PER_DESCRIPTION);
    }

    #[test]
    fn test_redirect_changes_active_course() {
        let fx = Fixture::new();
        let chem5 = fx.store.add_course("CHEM", "5", "General Chemistry").unwrap();
        let chem6 = fx.store.add_course("CHEM", "6", "General Chemistry II").unwrap();
        let department = Department::new("CHEM", "Chemistry");
        let context = DescriptionContext::for_year(2013);
        let options = MachineOptions {
            catalog_year: 2013,
            topic_scan: false,
            trace_tokens: false,
        };

        let outcome = OfferingMachine::new(
            &fx.store,
            &fx.corrections,
            &department,
            &chem5,
            "6 13F: 10",
            &context,
            options,
        )
        .run()
        .unwrap();

        assert_eq!(outcome.redirects, 1);
        assert!(fx.store.offerings_for(chem5.id).unwrap().is_empty());
        let offerings = fx.store.offerings_for(chem6.id).unwrap();
        assert_eq!(offerings.len(), 1);
        assert_eq!(offerings[0].term, Term::new(2013, Season::Fall));
    }

    #[test]
    fn test_colon_term_after_hours_starts_new_group() {
        let fx = Fixture::new();
        fx.run("13F: 9 14W:10");
        assert_eq!(fx.pairs(), pairs(&[("13F", "9"), ("14W", "10")]));
    }
}
