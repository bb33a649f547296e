//!
//! # Wafer Alignment: Marks & Strategies
//!

// Crates.io
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

// Local imports
use crate::utils::{enumstr, EnumStr};
use crate::{check_name, ErrorContext, JobError, JobResult, Xy};

enumstr!(
    /// # Alignment Mark Types
    #[derive(JsonSchema)]
    MarkType {
        Primary: "PM",
        Secondary: "SPM",
        SecondaryX: "SPM_X",
        SecondaryY: "SPM_Y",
        ExtendedX: "XPA_X",
        ExtendedY: "XPA_Y",
    }
);
impl Default for MarkType {
    fn default() -> Self {
        Self::Primary
    }
}

/// # Alignment Mark
#[derive(Debug, Clone, Deserialize, Serialize, JsonSchema, PartialEq, Eq)]
pub struct Mark {
    /// Mark ID, unique within its [Alignment]
    pub(crate) id: String,
    /// Mark Type
    #[serde(default)]
    pub(crate) mark_type: MarkType,
    /// Location, in wafer coordinates
    pub(crate) location: Xy,
}
impl Mark {
    /// Create a new [Mark]
    pub fn new(id: impl Into<String>, mark_type: MarkType, location: Xy) -> JobResult<Self> {
        let id = id.into();
        check_name(ErrorContext::Mark(id.clone()), &id, false)?;
        Ok(Self {
            id,
            mark_type,
            location,
        })
    }
    pub fn id(&self) -> &str {
        &self.id
    }
    pub fn mark_type(&self) -> MarkType {
        self.mark_type
    }
    pub fn location(&self) -> Xy {
        self.location
    }
}

/// # Alignment Strategy
///
/// A named, ordered selection of [Mark]s, referred to by ID.
/// Marks can be shared between strategies.
#[derive(Debug, Clone, Deserialize, Serialize, JsonSchema, PartialEq, Eq)]
pub struct Strategy {
    /// Strategy ID, unique within its [Alignment]
    pub(crate) id: String,
    /// Mark IDs, in alignment order
    #[serde(default)]
    pub(crate) marks: Vec<String>,
}
impl Strategy {
    /// Create a new [Strategy] from mark IDs `marks`.
    /// The marks are checked when the strategy is added to an [Alignment].
    pub fn new<S: Into<String>>(
        id: impl Into<String>,
        marks: impl IntoIterator<Item = S>,
    ) -> JobResult<Self> {
        let id = id.into();
        check_name(ErrorContext::Strategy(id.clone()), &id, false)?;
        Ok(Self {
            id,
            marks: marks.into_iter().map(Into::into).collect(),
        })
    }
    pub fn id(&self) -> &str {
        &self.id
    }
    /// Mark IDs, in alignment order
    pub fn marks(&self) -> &[String] {
        &self.marks
    }
}

///
/// # Alignment
///
/// The [Mark]s and [Strategy]s of a [crate::Job].
/// Alignment is in use only if at least one mark is defined.
///
#[derive(Debug, Clone, Default, Deserialize, Serialize, JsonSchema, PartialEq, Eq)]
pub struct Alignment {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub(crate) marks: Vec<Mark>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub(crate) strategies: Vec<Strategy>,
}
impl Alignment {
    /// Add a [Mark]. Fails if its ID is already in use.
    pub fn add_mark(&mut self, mark: Mark) -> JobResult<()> {
        if self.mark(&mark.id).is_some() {
            return Err(JobError::DuplicateId {
                kind: "Mark",
                id: mark.id,
            });
        }
        self.marks.push(mark);
        Ok(())
    }
    /// Add a [Strategy].
    /// Fails if its ID is already in use, or if it refers to any mark we do not have.
    pub fn add_strategy(&mut self, strategy: Strategy) -> JobResult<()> {
        if self.strategy(&strategy.id).is_some() {
            return Err(JobError::DuplicateId {
                kind: "Strategy",
                id: strategy.id,
            });
        }
        self.check_strategy(&strategy)?;
        self.strategies.push(strategy);
        Ok(())
    }
    /// Check that every mark named by `strategy` is one of ours
    pub(crate) fn check_strategy(&self, strategy: &Strategy) -> JobResult<()> {
        match strategy.marks.iter().find(|id| self.mark(id).is_none()) {
            Some(id) => Err(JobError::UnknownMarkReference {
                strategy: strategy.id.clone(),
                mark: id.clone(),
            }),
            None => Ok(()),
        }
    }
    /// Get a reference to the [Mark] with ID `id`
    pub fn mark(&self, id: &str) -> Option<&Mark> {
        self.marks.iter().find(|m| m.id == id)
    }
    /// Get a reference to the [Strategy] with ID `id`
    pub fn strategy(&self, id: &str) -> Option<&Strategy> {
        self.strategies.iter().find(|s| s.id == id)
    }
    pub fn marks(&self) -> &[Mark] {
        &self.marks
    }
    pub fn strategies(&self) -> &[Strategy] {
        &self.strategies
    }
    /// Number of marks defined
    pub fn len(&self) -> usize {
        self.marks.len()
    }
    /// Boolean indication of whether alignment is unused, i.e. there are no marks
    pub fn is_empty(&self) -> bool {
        self.marks.is_empty()
    }
    /// Check all of our internal invariants
    pub(crate) fn validate(&self) -> JobResult<()> {
        for (idx, mark) in self.marks.iter().enumerate() {
            check_name(ErrorContext::Mark(mark.id.clone()), &mark.id, false)?;
            if self.marks[..idx].iter().any(|m| m.id == mark.id) {
                return Err(JobError::DuplicateId {
                    kind: "Mark",
                    id: mark.id.clone(),
                });
            }
        }
        for (idx, strategy) in self.strategies.iter().enumerate() {
            check_name(ErrorContext::Strategy(strategy.id.clone()), &strategy.id, false)?;
            if self.strategies[..idx].iter().any(|s| s.id == strategy.id) {
                return Err(JobError::DuplicateId {
                    kind: "Strategy",
                    id: strategy.id.clone(),
                });
            }
            self.check_strategy(strategy)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn alignment() -> JobResult<Alignment> {
        let mut a = Alignment::default();
        a.add_mark(Mark::new("PM_L", MarkType::Primary, Xy::new(-30, 0))?)?;
        a.add_mark(Mark::new("PM_R", MarkType::Primary, Xy::new(30, 0))?)?;
        a.add_mark(Mark::new("SX", MarkType::SecondaryX, Xy::new(0, 20))?)?;
        Ok(a)
    }
    #[test]
    fn test_strategies() -> JobResult<()> {
        let mut a = alignment()?;
        a.add_strategy(Strategy::new("Global", ["PM_L", "PM_R"])?)?;
        a.add_strategy(Strategy::new("Fine", vec!["SX".to_string(), "PM_L".to_string()])?)?;
        assert_eq!(a.len(), 3);
        assert_eq!(a.strategy("Fine").unwrap().marks(), &["SX", "PM_L"]);
        Ok(())
    }
    #[test]
    fn test_unknown_mark() -> JobResult<()> {
        let mut a = alignment()?;
        let err = a
            .add_strategy(Strategy::new("Bad", ["PM_L", "NOPE"])?)
            .unwrap_err();
        match err {
            JobError::UnknownMarkReference { strategy, mark } => {
                assert_eq!(strategy, "Bad");
                assert_eq!(mark, "NOPE");
            }
            _ => panic!("Expected UnknownMarkReference, got {:?}", err),
        }
        assert!(a.strategies().is_empty());
        Ok(())
    }
    #[test]
    fn test_duplicate_mark() -> JobResult<()> {
        let mut a = alignment()?;
        let rv = a.add_mark(Mark::new("SX", MarkType::SecondaryY, Xy::default())?);
        assert!(rv.is_err());
        assert_eq!(a.len(), 3);
        assert_eq!(MarkType::parse_ignore_case("spm_x"), Some(MarkType::SecondaryX));
        Ok(())
    }
}
