use std::path::PathBuf;

use tinker_crypto::ContentDigest;
use tinker_ops::{GenesisMutator, MutationConfig, OpsResult};
use tinker_rewrite::{replace_delegator, replace_validator, ScratchFile};
use tinker_store::{write_atomic, DefaultLoader, GenesisDocument, Source, SourceLoader};
use tracing::{debug, info};

use crate::config::TinkerConfig;
use crate::context::RunContext;
use crate::error::{TinkerError, TinkerResult};
use crate::queue::TaskQueue;
use crate::task::{ByteTask, JsonTask, Phase, Task};

/// Outcome of a successful run.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RunReport {
    pub output: PathBuf,
    /// Digest of the exact bytes written to `output`.
    pub digest: ContentDigest,
    /// Number of logged steps.
    pub steps: u64,
    /// Phase the run finished in.
    pub phase: Phase,
}

/// Collects tasks and runs them against a genesis file.
pub struct GenesisTinker<L = DefaultLoader> {
    config: TinkerConfig,
    loader: L,
    queue: TaskQueue,
}

impl GenesisTinker<DefaultLoader> {
    pub fn new(config: TinkerConfig) -> Self {
        Self::with_loader(config, DefaultLoader::new())
    }
}

impl<L: SourceLoader> GenesisTinker<L> {
    pub fn with_loader(config: TinkerConfig, loader: L) -> Self {
        Self {
            config,
            loader,
            queue: TaskQueue::new(),
        }
    }

    pub fn config(&self) -> &TinkerConfig {
        &self.config
    }

    pub fn add_task(&mut self, task: impl Into<Task>) -> &mut Self {
        let task = task.into();
        let seq = self.queue.add(task);
        debug!(seq, "task queued");
        self
    }

    /// Pending tasks in execution order.
    pub fn tasks(&self) -> Vec<&Task> {
        self.queue.tasks()
    }

    pub fn clear_tasks(&mut self) {
        self.queue.clear();
    }

    /// Run every queued task and write the output.
    ///
    /// The queue is empty afterwards whether the run succeeded or not.
    pub fn run_tasks(&mut self) -> TinkerResult<RunReport> {
        let result = self.run();
        self.queue.clear();
        result
    }

    fn run(&mut self) -> TinkerResult<RunReport> {
        if self.queue.is_empty() {
            return Err(TinkerError::NoTasks);
        }
        self.queue.validate()?;

        let mut ctx = RunContext::new();
        let source = self.config.source();
        let mutation = self.config.mutation_config();

        while let Some(task) = self.queue.next() {
            match task {
                Task::Bytes(task) => self.run_byte_task(&mut ctx, &source, &task)?,
                Task::Json(task) => {
                    if ctx.phase == Phase::Bytes && self.queue.phase() == Phase::Json {
                        debug!("switching to json phase");
                        ctx.phase = Phase::Json;
                    }
                    self.run_json_task(&mut ctx, &source, &mutation, &task)?
                }
            }
        }

        let bytes = match (&ctx.document, &ctx.scratch) {
            (Some(doc), _) => doc.to_bytes(self.config.output_style)?,
            (None, Some(scratch)) => scratch.read()?,
            (None, None) => return Err(TinkerError::NoTasks),
        };
        ctx.steps.log(format!(
            "Saving genesis to file {}",
            self.config.output.display()
        ));
        write_atomic(&self.config.output, &bytes)?;

        let digest = self.config.digest.digest(&bytes);
        info!("{}: {}", self.config.digest.sum_label(), digest);
        Ok(RunReport {
            output: self.config.output.clone(),
            digest,
            steps: ctx.steps.count(),
            phase: ctx.phase,
        })
    }

    fn load_source(&self, ctx: &mut RunContext, source: &Source) -> TinkerResult<Vec<u8>> {
        let mut message = format!("Loading genesis from {source}");
        if let Some(sum) = &self.config.shasum {
            message.push_str(&format!(" with {} {sum}", self.config.digest));
        }
        ctx.steps.log(message);
        Ok(self
            .loader
            .load(source, self.config.shasum.as_deref(), self.config.digest)?)
    }

    fn run_byte_task(&self, ctx: &mut RunContext, source: &Source, task: &ByteTask) -> TinkerResult<()> {
        if ctx.scratch.is_none() {
            let bytes = self.load_source(ctx, source)?;
            let at = self.config.preprocessing.as_deref();
            ctx.steps.log(match at {
                Some(path) => format!("Creating preprocessing file {}", path.display()),
                None => "Creating preprocessing file".to_string(),
            });
            ctx.scratch = Some(ScratchFile::create(
                &bytes,
                at,
                self.config.keep_preprocessing,
            )?);
        }
        let RunContext { steps, scratch, .. } = ctx;
        let Some(scratch) = scratch.as_mut() else {
            return Err(TinkerError::Config("scratch file was not created".into()));
        };
        let report = match task {
            ByteTask::ReplaceValidator { old, new } => replace_validator(scratch, old, new, steps)?,
            ByteTask::ReplaceDelegator { old, new } => replace_delegator(scratch, old, new, steps)?,
        };
        debug!(task = task.name(), matches = report.total(), "byte task applied");
        Ok(())
    }

    fn run_json_task(
        &self,
        ctx: &mut RunContext,
        source: &Source,
        mutation: &MutationConfig,
        task: &JsonTask,
    ) -> TinkerResult<()> {
        if ctx.document.is_none() {
            let doc = match &ctx.scratch {
                Some(scratch) => {
                    ctx.steps.log(format!(
                        "Loading genesis from preprocessing file {}",
                        scratch.path().display()
                    ));
                    GenesisDocument::from_slice(&scratch.read()?)?
                }
                None => GenesisDocument::from_slice(&self.load_source(ctx, source)?)?,
            };
            ctx.document = Some(doc);
        }
        let RunContext { steps, document, .. } = ctx;
        let Some(doc) = document.as_mut() else {
            return Err(TinkerError::Config("genesis document was not loaded".into()));
        };
        let mut m = GenesisMutator::new(doc, mutation, steps);
        apply(&mut m, task)?;
        Ok(())
    }
}

fn apply(m: &mut GenesisMutator<'_>, task: &JsonTask) -> OpsResult<()> {
    match task {
        JsonTask::SetChainId { chain_id } => m.set_chain_id(chain_id),
        JsonTask::SetUnbondingTime { unbonding_time } => m.set_unbonding_time(unbonding_time),
        JsonTask::SetVotingPeriod { voting_period } => m.set_voting_period(voting_period),
        JsonTask::SetMaxDepositPeriod { max_deposit_period } => {
            m.set_max_deposit_period(max_deposit_period)
        }
        JsonTask::SetMinDeposit { deposit } => m.set_min_deposit(deposit),
        JsonTask::SetTallyParam { name, value } => m.set_tally_param(name, value),
        JsonTask::CreateCoin { denom, amount } => m.create_coin(denom, amount),
        JsonTask::IncreaseSupply { denom, delta } => m.increase_supply(delta, denom),
        JsonTask::IncreaseBalance {
            address,
            delta,
            denom,
        } => m.increase_balance(address, delta, denom),
        JsonTask::IncreaseValidatorPower {
            operator_address,
            validator_address,
            delta,
        } => m.increase_validator_power(operator_address, validator_address, delta),
        JsonTask::IncreaseValidatorStake {
            operator_address,
            delta,
            denom,
        } => m.increase_validator_stake(operator_address, delta, denom),
        JsonTask::IncreaseDelegatorStake {
            delegator_address,
            validator_address,
            delta,
        } => m.increase_delegator_stake(delegator_address, validator_address.as_deref(), delta),
        JsonTask::IncreaseDelegatorStakeToValidator {
            delegator,
            validator,
            increase,
        } => m.increase_delegator_stake_to_validator(delegator, validator, increase),
    }
}
