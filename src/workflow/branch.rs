/// `<story id>-<suffix>`
pub fn branch_name(story_id: u64, suffix: &str) -> String {
    format!("{story_id}-{suffix}")
}

/// Story id from a `<story id>-<suffix>` branch. `None` when there is no `-`
/// or the prefix is not a story id.
pub fn story_id_from_branch(branch: &str) -> Option<u64> {
    let (prefix, _) = branch.split_once('-')?;
    prefix.parse().ok()
}
