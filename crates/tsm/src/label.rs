//! User labels, per-subspace partial labels, and three-way predictions.

use std::fmt;

use crate::error::TsmError;

/// Binary user label.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Label {
    Positive,
    Negative,
}

impl Label {
    #[inline]
    pub fn is_positive(self) -> bool {
        self == Self::Positive
    }

    #[inline]
    pub fn is_negative(self) -> bool {
        self == Self::Negative
    }

    /// `1.0` for positive, `-1.0` for negative.
    #[inline]
    pub fn as_sign(self) -> f64 {
        match self {
            Self::Positive => 1.0,
            Self::Negative => -1.0,
        }
    }

    /// Positive for strictly positive signs, negative otherwise.
    #[inline]
    pub fn from_sign(sign: f64) -> Self {
        if sign > 0.0 {
            Self::Positive
        } else {
            Self::Negative
        }
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Positive => write!(f, "POSITIVE"),
            Self::Negative => write!(f, "NEGATIVE"),
        }
    }
}

/// One partial label per feature group; the global label is their
/// conjunction (positive only if every subspace is positive).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LabelGroup {
    labels: Vec<Label>,
}

impl LabelGroup {
    pub fn new(labels: Vec<Label>) -> Result<Self, TsmError> {
        if labels.is_empty() {
            return Err(TsmError::label("label group must not be empty"));
        }
        Ok(Self { labels })
    }

    #[inline]
    pub fn labels(&self) -> &[Label] {
        &self.labels
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    #[inline]
    pub fn is_positive(&self) -> bool {
        self.labels.iter().all(|l| l.is_positive())
    }
}

impl fmt::Display for LabelGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[")?;
        for (i, l) in self.labels.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{l}")?;
        }
        write!(f, "]")
    }
}

/// Label attached to a labeled point: either global or per subspace.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum UserLabel {
    Global(Label),
    Partial(LabelGroup),
}

impl UserLabel {
    #[inline]
    pub fn is_positive(&self) -> bool {
        match self {
            Self::Global(l) => l.is_positive(),
            Self::Partial(g) => g.is_positive(),
        }
    }

    #[inline]
    pub fn is_negative(&self) -> bool {
        !self.is_positive()
    }

    /// Label of subspace `group` out of `n_groups`.
    ///
    /// A global positive holds in every subspace. A global negative only
    /// determines the subspace when there is a single group.
    pub fn for_subspace(&self, group: usize, n_groups: usize) -> Result<Label, TsmError> {
        match self {
            Self::Global(Label::Positive) => Ok(Label::Positive),
            Self::Global(Label::Negative) if n_groups == 1 => Ok(Label::Negative),
            Self::Global(Label::Negative) => Err(TsmError::label(format!(
                "global negative label is ambiguous across {n_groups} feature groups"
            ))),
            Self::Partial(g) if g.len() != n_groups => Err(TsmError::label(format!(
                "expected {n_groups} partial labels, got {}",
                g.len()
            ))),
            Self::Partial(g) => Ok(g.labels()[group]),
        }
    }
}

impl From<Label> for UserLabel {
    fn from(label: Label) -> Self {
        Self::Global(label)
    }
}

impl From<LabelGroup> for UserLabel {
    fn from(group: LabelGroup) -> Self {
        Self::Partial(group)
    }
}

/// Three-way prediction.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ExtendedLabel {
    Positive,
    Negative,
    Unknown,
}

impl ExtendedLabel {
    /// `1`, `-1`, or `0` for unknown.
    #[inline]
    pub fn as_sign(self) -> i8 {
        match self {
            Self::Positive => 1,
            Self::Negative => -1,
            Self::Unknown => 0,
        }
    }

    #[inline]
    pub fn is_positive(self) -> bool {
        self == Self::Positive
    }

    #[inline]
    pub fn is_negative(self) -> bool {
        self == Self::Negative
    }

    #[inline]
    pub fn is_unknown(self) -> bool {
        self == Self::Unknown
    }

    #[inline]
    pub fn is_known(self) -> bool {
        !self.is_unknown()
    }

    #[inline]
    pub fn to_label(self) -> Option<Label> {
        match self {
            Self::Positive => Some(Label::Positive),
            Self::Negative => Some(Label::Negative),
            Self::Unknown => None,
        }
    }
}

impl From<Label> for ExtendedLabel {
    fn from(label: Label) -> Self {
        match label {
            Label::Positive => Self::Positive,
            Label::Negative => Self::Negative,
        }
    }
}

impl fmt::Display for ExtendedLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Positive => write!(f, "POSITIVE"),
            Self::Negative => write!(f, "NEGATIVE"),
            Self::Unknown => write!(f, "UNKNOWN"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn group_is_conjunction_of_partials() {
        let g = LabelGroup::new(vec![Label::Positive, Label::Negative]).unwrap();
        assert!(!g.is_positive());
        let g = LabelGroup::new(vec![Label::Positive]).unwrap();
        assert!(g.is_positive());
        assert!(LabelGroup::new(Vec::new()).is_err());
    }

    #[test]
    fn subspace_labels() {
        let partial: UserLabel = LabelGroup::new(vec![Label::Positive, Label::Negative])
            .unwrap()
            .into();
        assert_eq!(partial.for_subspace(1, 2).unwrap(), Label::Negative);
        assert!(partial.for_subspace(0, 3).is_err());

        let pos = UserLabel::Global(Label::Positive);
        assert_eq!(pos.for_subspace(2, 4).unwrap(), Label::Positive);

        let neg = UserLabel::Global(Label::Negative);
        assert_eq!(neg.for_subspace(0, 1).unwrap(), Label::Negative);
        assert!(matches!(
            neg.for_subspace(0, 2),
            Err(TsmError::MalformedLabel { .. })
        ));
    }

    #[test]
    fn extended_label_signs() {
        assert_eq!(ExtendedLabel::Positive.as_sign(), 1);
        assert_eq!(ExtendedLabel::Negative.as_sign(), -1);
        assert_eq!(ExtendedLabel::Unknown.as_sign(), 0);
        assert!(!ExtendedLabel::Unknown.is_known());
        assert_eq!(ExtendedLabel::Unknown.to_label(), None);
        assert_eq!(ExtendedLabel::from(Label::Negative), ExtendedLabel::Negative);
        assert_eq!(ExtendedLabel::Positive.to_string(), "POSITIVE");
    }
}
