pub mod branch_name;

/// Names rejected for branches: leading dot or slash, `..`, `/.`, trailing
/// slash, `.lock` suffix, `@{`, control characters and the characters
/// `*:?[\~^`
pub const INVALID_BRANCH_NAME_REGEX: &str =
    r"^\.|\/\.|\.\.|^\/|\/$|\.lock$|@\{|[\x00-\x20\*:\?\[\\~\^\x7f]";

/// Branch created by `init`
pub const DEFAULT_BRANCH: &str = "master";
