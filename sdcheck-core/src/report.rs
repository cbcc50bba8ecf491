use anyhow::Result;
use std::io::Write;

const RULE: &str = "========================================";

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CheckResult {
    pub name: String,
    pub passed: bool,
    pub detail: Option<String>,
}

impl CheckResult {
    pub fn pass(name: impl Into<String>) -> Self {
        Self { name: name.into(), passed: true, detail: None }
    }
    pub fn fail(name: impl Into<String>, detail: impl Into<String>) -> Self {
        Self { name: name.into(), passed: false, detail: Some(detail.into()) }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct VerificationTally {
    pub pass_count: u64,
    pub fail_count: u64,
}

impl VerificationTally {
    pub fn add(&mut self, passed: bool) {
        if passed {
            self.pass_count += 1;
        } else {
            self.fail_count += 1;
        }
    }
    pub fn is_success(&self) -> bool {
        self.fail_count == 0
    }
}

/// Streams one line per check to `out` and keeps the running tally.
pub struct Reporter<W: Write> {
    out: W,
    tally: VerificationTally,
}

impl<W: Write> Reporter<W> {
    pub fn new(out: W) -> Self {
        Self { out, tally: VerificationTally::default() }
    }

    pub fn tally(&self) -> VerificationTally {
        self.tally
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    pub fn record(&mut self, res: CheckResult) -> Result<()> {
        self.tally.add(res.passed);
        let status = if res.passed { "PASS" } else { "FAIL" };
        match res.detail.as_deref() {
            Some(d) if !d.is_empty() => writeln!(self.out, "  {}: {} - {}", status, res.name, d)?,
            _ => writeln!(self.out, "  {}: {}", status, res.name)?,
        }
        self.out.flush()?;
        Ok(())
    }

    /// Record a check whose detail is only shown on failure.
    pub fn check(&mut self, name: impl Into<String>, ok: bool, detail: impl FnOnce() -> String) -> Result<()> {
        let res = if ok { CheckResult::pass(name) } else { CheckResult::fail(name, detail()) };
        self.record(res)
    }

    pub fn section(&mut self, title: &str) -> Result<()> {
        writeln!(self.out, "\n[{}]", title)?;
        Ok(())
    }

    pub fn note(&mut self, text: &str) -> Result<()> {
        writeln!(self.out, "{}", text)?;
        Ok(())
    }

    pub fn summary(&mut self) -> Result<VerificationTally> {
        let t = self.tally;
        writeln!(self.out)?;
        writeln!(self.out, "{}", RULE)?;
        writeln!(self.out, "  Verification: {} passed, {} failed", t.pass_count, t.fail_count)?;
        writeln!(self.out, "{}", RULE)?;
        if t.is_success() {
            writeln!(self.out, "\nAll verifications passed.")?;
        } else {
            writeln!(self.out, "\n{} VERIFICATION(S) FAILED.", t.fail_count)?;
        }
        self.out.flush()?;
        Ok(t)
    }
}
