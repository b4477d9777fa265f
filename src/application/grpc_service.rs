use futures::stream::{FuturesUnordered, StreamExt};
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;
use tonic::{Request, Response, Status, Streaming};
use tracing::{info, warn};

use super::mappers::{self, sourcing};
use super::SourcingService;
use crate::domain::ModelBuilder;
use crate::infrastructure::to_lp_string;

/// Replies buffered per scenario stream before backpressure applies
const SCENARIO_BUFFER: usize = 16;

/// gRPC service implementation
#[derive(Clone)]
pub struct GrpcSourcingService {
    service: SourcingService,
}

impl GrpcSourcingService {
    pub fn new(service: SourcingService) -> Self {
        Self { service }
    }

    /// Solves one request on the blocking pool
    async fn solve_request(
        &self,
        request: sourcing::PlanRequest,
    ) -> Result<sourcing::PlanReply, Status> {
        let scenario = request.scenario;
        let data =
            mappers::proto_to_problem_data(request.data.unwrap_or_default()).map_err(|e| *e)?;
        let options =
            mappers::proto_to_build_options(request.options, &scenario, self.service.options());
        let time_limit = mappers::time_limit(request.time_limit_secs, self.service.time_limit())
            .map_err(|e| *e)?;

        info!(scenario = %scenario, "Planning request received");

        let service = self.service.clone();
        let outcome =
            tokio::task::spawn_blocking(move || service.plan_with(&data, &options, time_limit))
                .await
                .map_err(|e| Status::internal(format!("Planning task failed: {}", e)))?
                .map_err(|e| {
                    warn!(scenario = %scenario, error = %e, "Planning request rejected");
                    mappers::error_to_status(e)
                })?;

        Ok(mappers::outcome_to_reply(
            scenario,
            outcome,
            self.service.solver_name(),
        ))
    }
}

#[tonic::async_trait]
impl sourcing::sourcing_planner_server::SourcingPlanner for GrpcSourcingService {
    async fn plan(
        &self,
        request: Request<sourcing::PlanRequest>,
    ) -> Result<Response<sourcing::PlanReply>, Status> {
        let reply = self.solve_request(request.into_inner()).await?;
        Ok(Response::new(reply))
    }

    type PlanScenariosStream = ReceiverStream<Result<sourcing::PlanReply, Status>>;

    /// Scenarios are solved concurrently; replies are sent as solves finish.
    /// The first failed scenario ends the stream with its status.
    async fn plan_scenarios(
        &self,
        request: Request<Streaming<sourcing::PlanRequest>>,
    ) -> Result<Response<Self::PlanScenariosStream>, Status> {
        let mut inbound = request.into_inner();
        let (tx, rx) = mpsc::channel(SCENARIO_BUFFER);
        let this = self.clone();

        tokio::spawn(async move {
            let mut pending = FuturesUnordered::new();
            let mut inbound_open = true;
            let mut sent = 0usize;

            loop {
                tokio::select! {
                    message = inbound.message(), if inbound_open => match message {
                        Ok(Some(request)) => pending.push(this.solve_request(request)),
                        Ok(None) => inbound_open = false,
                        Err(status) => {
                            let _ = tx.send(Err(status)).await;
                            return;
                        }
                    },
                    Some(result) = pending.next(), if !pending.is_empty() => {
                        let failed = result.is_err();
                        if tx.send(result).await.is_err() || failed {
                            return;
                        }
                        sent += 1;
                    }
                    else => break,
                }
            }

            info!(scenarios = sent, "Scenario sweep finished");
        });

        Ok(Response::new(ReceiverStream::new(rx)))
    }

    async fn export_program(
        &self,
        request: Request<sourcing::PlanRequest>,
    ) -> Result<Response<sourcing::ProgramText>, Status> {
        let request = request.into_inner();
        let data =
            mappers::proto_to_problem_data(request.data.unwrap_or_default()).map_err(|e| *e)?;
        let options = mappers::proto_to_build_options(
            request.options,
            &request.scenario,
            self.service.options(),
        );

        let program = ModelBuilder::new(&data, &options)
            .build()
            .map_err(|e| mappers::error_to_status(e.into()))?;
        let lp = to_lp_string(&program).map_err(|e| mappers::error_to_status(e.into()))?;

        info!(
            scenario = %request.scenario,
            variables = program.num_variables(),
            constraints = program.num_constraints(),
            "Exported program"
        );

        Ok(Response::new(sourcing::ProgramText {
            scenario: request.scenario,
            lp,
            num_variables: program.num_variables() as u32,
            num_constraints: program.num_constraints() as u32,
        }))
    }
}
