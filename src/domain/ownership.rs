use super::post::Post;
use super::user::User;

/// A post may be mutated or deleted only by its author.
///
/// Evaluated immediately before every mutating post operation, never cached
/// across calls: the acting principal or the post's ownership may have
/// changed between a page render and the submission acting on it.
pub fn can_modify(actor: &User, post: &Post) -> bool {
    actor.id == post.author_id
}
