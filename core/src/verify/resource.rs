/// Raises the soft stack limit up to the hard limit so that deeply recursive
/// solutions run by child processes are not starved.
#[cfg(unix)]
pub fn raise_stack_limit() -> anyhow::Result<()> {
    use nix::sys::resource::{getrlimit, setrlimit, Resource};

    let (soft, hard) = getrlimit(Resource::RLIMIT_STACK)?;
    if soft < hard {
        setrlimit(Resource::RLIMIT_STACK, hard, hard)?;
        log::debug!("stack limit raised: {} -> {}", soft, hard);
    }
    Ok(())
}

#[cfg(not(unix))]
pub fn raise_stack_limit() -> anyhow::Result<()> {
    anyhow::bail!("stack limit cannot be changed on this platform")
}
