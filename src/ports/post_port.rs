//! Post source port trait.

use crate::domain::error::PosttraderError;
use crate::domain::post::Post;

/// A source of posts. Implementations return every post they hold; the
/// simulator does its own chronological ordering.
pub trait PostPort {
    fn fetch_posts(&self) -> Result<Vec<Post>, PosttraderError>;

    /// Short label used in logs and error messages.
    fn name(&self) -> &str;
}
