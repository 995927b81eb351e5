//! Bundle engine signing.
//!
//! A bundle executable embeds an engine executable whose signature is checked
//! on its own. The engine can only be taken from the built bundle, must be
//! signed before it goes back in, and the bundle is signed last:
//!
//! ```text
//! BundleBuilt --extract--> EngineExtracted --sign--> EngineSigned
//!     --reinsert--> EngineReinserted --sign--> SignedBundle
//! ```
//!
//! Each transition consumes the previous state, so skipping or repeating a
//! step does not compile. A failed step leaves the chain consumed; the run
//! has to start again from a freshly built bundle.

use crate::bundler::builder::CodeSigner;
use crate::bundler::error::Result;
use crate::bundler::process::{Invoker, ToolCommand, ToolRunner};
use std::marker::PhantomData;
use std::path::{Path, PathBuf};

/// Bundle written by the bundler, unsigned.
#[derive(Debug)]
pub struct BundleBuilt;
/// Engine extracted to its side path.
#[derive(Debug)]
pub struct EngineExtracted;
/// Engine signed, not yet back in the bundle.
#[derive(Debug)]
pub struct EngineSigned;
/// Signed engine embedded, bundle still unsigned.
#[derive(Debug)]
pub struct EngineReinserted;

/// Names a chain state in logs.
pub trait ChainState {
    /// Human-readable state name.
    const NAME: &'static str;
}

impl ChainState for BundleBuilt {
    const NAME: &'static str = "bundle built";
}
impl ChainState for EngineExtracted {
    const NAME: &'static str = "engine extracted";
}
impl ChainState for EngineSigned {
    const NAME: &'static str = "engine signed";
}
impl ChainState for EngineReinserted {
    const NAME: &'static str = "engine reinserted";
}

/// Fully signed bundle; the terminal state.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct SignedBundle {
    /// Signed bundle executable
    pub bundle: PathBuf,
    /// Signed engine that is embedded in it
    pub engine: PathBuf,
}

/// The engine signing sequence for one bundle.
pub struct BundleSigningChain<'a, R, S> {
    invoker: &'a Invoker<R>,
    signer: &'a CodeSigner,
    insignia: &'a str,
    bundle: PathBuf,
    engine: PathBuf,
    _state: PhantomData<S>,
}

impl<R, S: ChainState> std::fmt::Debug for BundleSigningChain<'_, R, S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BundleSigningChain")
            .field("state", &S::NAME)
            .field("bundle", &self.bundle)
            .field("engine", &self.engine)
            .finish()
    }
}

impl<'a, R: ToolRunner, S: ChainState> BundleSigningChain<'a, R, S> {
    /// Bundle executable.
    pub fn bundle(&self) -> &Path {
        &self.bundle
    }

    /// Side path of the engine.
    pub fn engine(&self) -> &Path {
        &self.engine
    }

    /// Current state name.
    pub fn state(&self) -> &'static str {
        S::NAME
    }

    fn advance<T: ChainState>(self) -> BundleSigningChain<'a, R, T> {
        log::debug!("Bundle signing: {} -> {}", S::NAME, T::NAME);
        BundleSigningChain {
            invoker: self.invoker,
            signer: self.signer,
            insignia: self.insignia,
            bundle: self.bundle,
            engine: self.engine,
            _state: PhantomData,
        }
    }
}

impl<'a, R: ToolRunner> BundleSigningChain<'a, R, BundleBuilt> {
    /// Starts the chain for a bundle the bundler just wrote.
    pub(crate) fn new(
        invoker: &'a Invoker<R>,
        signer: &'a CodeSigner,
        insignia: &'a str,
        bundle: PathBuf,
        engine: PathBuf,
    ) -> Self {
        Self {
            invoker,
            signer,
            insignia,
            bundle,
            engine,
            _state: PhantomData,
        }
    }

    /// `insignia -ib <bundle> -o <engine>`
    pub async fn extract_engine(self) -> Result<BundleSigningChain<'a, R, EngineExtracted>> {
        let command = ToolCommand::new("extract bundle engine", self.insignia)
            .arg("-ib")
            .arg_path(&self.bundle)
            .arg("-o")
            .arg_path(&self.engine);
        self.invoker.invoke(&command).await?;
        Ok(self.advance())
    }

    /// Runs all four steps.
    pub async fn run(self) -> Result<SignedBundle> {
        self.extract_engine()
            .await?
            .sign_engine()
            .await?
            .reinsert_engine()
            .await?
            .sign_bundle()
            .await
    }
}

impl<'a, R: ToolRunner> BundleSigningChain<'a, R, EngineExtracted> {
    /// Signs the extracted engine.
    pub async fn sign_engine(self) -> Result<BundleSigningChain<'a, R, EngineSigned>> {
        self.signer
            .sign(self.invoker, "sign bundle engine", &[&self.engine])
            .await?;
        Ok(self.advance())
    }
}

impl<'a, R: ToolRunner> BundleSigningChain<'a, R, EngineSigned> {
    /// `insignia -ab <engine> <bundle> -o <bundle>`
    pub async fn reinsert_engine(self) -> Result<BundleSigningChain<'a, R, EngineReinserted>> {
        let command = ToolCommand::new("reinsert bundle engine", self.insignia)
            .arg("-ab")
            .arg_path(&self.engine)
            .arg_path(&self.bundle)
            .arg("-o")
            .arg_path(&self.bundle);
        self.invoker.invoke(&command).await?;
        Ok(self.advance())
    }
}

impl<R: ToolRunner> BundleSigningChain<'_, R, EngineReinserted> {
    /// Signs the bundle, finishing the chain.
    pub async fn sign_bundle(self) -> Result<SignedBundle> {
        self.signer
            .sign(self.invoker, "sign bundle", &[&self.bundle])
            .await?;
        log::debug!("Bundle signing: {} -> signed", EngineReinserted::NAME);
        Ok(SignedBundle {
            bundle: self.bundle,
            engine: self.engine,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bundler::builder::SigningKey;
    use crate::bundler::process::RecordingRunner;
    use crate::bundler::SettingsBuilder;
    use tokio_util::sync::CancellationToken;

    fn signer() -> CodeSigner {
        let settings = SettingsBuilder::new().repo_root("/repo").build().unwrap();
        CodeSigner::new(&settings, SigningKey::new("/key.pfx"))
    }

    fn chain<'a>(
        invoker: &'a Invoker<RecordingRunner>,
        signer: &'a CodeSigner,
    ) -> BundleSigningChain<'a, RecordingRunner, BundleBuilt> {
        BundleSigningChain::new(
            invoker,
            signer,
            "insignia",
            PathBuf::from("/build/product-1.2.exe"),
            PathBuf::from("/build/engine-1.2.exe"),
        )
    }

    #[tokio::test]
    async fn runs_steps_in_total_order() {
        let signer = signer();
        let invoker = Invoker::new(RecordingRunner::new(), CancellationToken::new());

        let signed = chain(&invoker, &signer).run().await.unwrap();

        assert_eq!(signed.bundle, Path::new("/build/product-1.2.exe"));
        let calls = invoker.runner().calls();
        let stages: Vec<_> = calls.iter().map(|c| c.stage()).collect();
        assert_eq!(
            stages,
            [
                "extract bundle engine",
                "sign bundle engine",
                "reinsert bundle engine",
                "sign bundle"
            ]
        );
        assert_eq!(
            calls[0].get_args(),
            ["-ib", "/build/product-1.2.exe", "-o", "/build/engine-1.2.exe"]
        );
        assert_eq!(calls[1].get_args().last().unwrap(), "/build/engine-1.2.exe");
        assert_eq!(
            calls[2].get_args(),
            [
                "-ab",
                "/build/engine-1.2.exe",
                "/build/product-1.2.exe",
                "-o",
                "/build/product-1.2.exe"
            ]
        );
        assert_eq!(calls[3].get_args().last().unwrap(), "/build/product-1.2.exe");
    }

    #[tokio::test]
    async fn tracks_state_through_transitions() {
        let signer = signer();
        let invoker = Invoker::new(RecordingRunner::new(), CancellationToken::new());

        let built = chain(&invoker, &signer);
        assert_eq!(built.state(), "bundle built");
        let extracted = built.extract_engine().await.unwrap();
        assert_eq!(extracted.state(), "engine extracted");
        let signed = extracted.sign_engine().await.unwrap();
        assert_eq!(signed.state(), "engine signed");
        let reinserted = signed.reinsert_engine().await.unwrap();
        assert_eq!(reinserted.state(), "engine reinserted");
        reinserted.sign_bundle().await.unwrap();
    }

    #[tokio::test]
    async fn failed_extraction_stops_the_chain() {
        let signer = signer();
        let runner = RecordingRunner::new();
        runner.fail_program("insignia", 1);
        let invoker = Invoker::new(runner, CancellationToken::new());

        assert!(chain(&invoker, &signer).run().await.is_err());
        assert_eq!(invoker.runner().programs(), ["insignia"]);
    }

    #[tokio::test]
    async fn failed_engine_signature_never_reinserts() {
        let signer = signer();
        let runner = RecordingRunner::new();
        runner.fail_program("signtool", 1);
        let invoker = Invoker::new(runner, CancellationToken::new());

        let err = chain(&invoker, &signer).run().await.unwrap_err();

        assert_eq!(err.tool_exit_code(), Some(1));
        assert_eq!(invoker.runner().programs(), ["insignia", "signtool"]);
    }

    #[tokio::test]
    async fn failed_reinsertion_leaves_bundle_unsigned() {
        let signer = signer();
        let runner = RecordingRunner::new();
        runner.respond_when(
            |cmd| cmd.get_args().first().is_some_and(|a| a == "-ab"),
            crate::bundler::process::ToolOutput::exit(4),
        );
        let invoker = Invoker::new(runner, CancellationToken::new());

        let err = chain(&invoker, &signer).run().await.unwrap_err();

        assert_eq!(err.tool_exit_code(), Some(4));
        assert_eq!(
            invoker.runner().programs(),
            ["insignia", "signtool", "insignia"]
        );
    }
}
