pub mod approval;
pub mod normalizer;
pub mod reconciler;
