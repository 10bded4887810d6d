//! Structural elements module

mod joint;
mod member;
mod support;

pub use joint::{Joint, JointId};
pub use member::{Member, MemberId, MemberReleases, MemberStiffness};
pub use support::{Fixity, Support, SupportId};
