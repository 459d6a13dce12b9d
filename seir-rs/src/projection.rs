use crate::{
    error::Result,
    params::{CountryClass, ModelConstants, ParameterVector, RawParams},
    region::{RegionIdentity, RegionMetadata, SimulationWindow},
    sim::{ImportSchedule, Kernels, RenewalEngine, RunOptions, SimulationOutput},
    trajectory::{build_trajectories, DerivedTrajectories},
};
use getset::Getters;
use log::info;
use rand::Rng;

/// A projection for a single region.
///
/// Construction resolves parameters, builds every trajectory, kernel and the
/// import schedule. After that, the projection is immutable and can be run
/// any number of times.
#[derive(Debug, Clone, Getters)]
#[getset(get = "pub")]
pub struct Projection {
    identity: RegionIdentity,
    metadata: RegionMetadata,
    window: SimulationWindow,
    constants: ModelConstants,
    params: ParameterVector,
    trajectories: DerivedTrajectories,
    kernels: Kernels,
    imports: ImportSchedule,
}

impl Projection {
    /// Create projection from raw params. Uncertain params take the mode of
    /// their distributions.
    pub fn new(
        identity: RegionIdentity,
        metadata: RegionMetadata,
        window: SimulationWindow,
        raw: RawParams,
        constants: ModelConstants,
    ) -> Result<Self> {
        let params = ParameterVector::resolve_fixed(&raw, &identity, &window, &constants)?;
        Self::from_params(identity, metadata, window, params, constants)
    }

    /// Create projection from raw params, drawing uncertain params from rng.
    pub fn with_rng<R: Rng>(
        identity: RegionIdentity,
        metadata: RegionMetadata,
        window: SimulationWindow,
        raw: RawParams,
        constants: ModelConstants,
        rng: &mut R,
    ) -> Result<Self> {
        let params = ParameterVector::resolve(&raw, &identity, &window, &constants, Some(rng))?;
        Self::from_params(identity, metadata, window, params, constants)
    }

    /// Create projection from an already resolved parameter vector.
    pub fn from_params(
        identity: RegionIdentity,
        metadata: RegionMetadata,
        window: SimulationWindow,
        params: ParameterVector,
        constants: ModelConstants,
    ) -> Result<Self> {
        let trajectories = build_trajectories(&identity, &metadata, &window, &params, &constants)?;
        let kernels = Kernels::from_constants(&constants)?;
        let imports = ImportSchedule::new(
            &params,
            &CountryClass::of_region(&identity),
            window.n_days(),
            &constants.imports,
        )?;
        Ok(Projection {
            identity,
            metadata,
            window,
            constants,
            params,
            trajectories,
            kernels,
            imports,
        })
    }

    pub fn engine(&self) -> Result<RenewalEngine<'_>> {
        RenewalEngine::new(
            &self.window,
            &self.trajectories,
            &self.kernels,
            &self.imports,
            self.metadata.population(),
            &self.constants,
        )
    }

    /// Run with default options.
    pub fn run(&self) -> Result<SimulationOutput> {
        self.run_with(&RunOptions::default())
    }

    pub fn run_with(&self, options: &RunOptions) -> Result<SimulationOutput> {
        info!("running projection for {} ({} days)", self.identity, self.window.n_days());
        self.engine()?.run(options)
    }
}
