/// A catalog entry: the question text and its position in the rotation.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Question {
    pub text: String,
    pub position: usize,
}
