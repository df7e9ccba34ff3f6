//! Application state holder - What a UI talks to.
//!
//! [`FitnessState`] mirrors the three live collections and exposes the add,
//! delete, register and login operations. Every operation is queued on a single
//! worker task, so jobs run one at a time in submission order. Each call returns a
//! [`Pending`] future with the outcome; dropping it makes the call fire-and-forget.
//!
//! The worker and the mirror tasks live as long as the state holder: they stop
//! when the last clone is dropped or [`FitnessState::close`] is called, and jobs
//! still queued at that point resolve to [`Error::Cancelled`].

use crate::{
    core::{
        live::LiveQuery,
        meal::NewMeal,
        meditation::NewMeditationSession,
        preference::SavedLogin,
        user::NewUser,
        workout::NewWorkout,
    },
    entities::{meal, meditation_session, workout},
    errors::{Error, Result},
    repository::FitnessRepository,
};
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};
use tokio::sync::{mpsc, oneshot, watch};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

/// Result of a registration attempt.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RegisterOutcome {
    /// The user was stored
    Registered,
    /// Another user already has this name; nothing was stored
    UsernameTaken,
}

/// Result of a login attempt.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LoginOutcome {
    /// Username and password match; the login is remembered
    Success,
    /// No user with that name
    UserNotFound,
    /// The user exists but the password differs
    WrongPassword,
}

impl LoginOutcome {
    /// Message shown by the login screen.
    #[must_use]
    pub const fn message(self) -> &'static str {
        match self {
            Self::Success => "Success",
            Self::UserNotFound => "User not found",
            Self::WrongPassword => "Wrong Password",
        }
    }
}

type Reply<T> = oneshot::Sender<Result<T>>;

/// Outcome of a queued job. Resolves once the worker has run it.
#[derive(Debug)]
pub struct Pending<T> {
    rx: oneshot::Receiver<Result<T>>,
}

impl<T> Future for Pending<T> {
    type Output = Result<T>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        Pin::new(&mut self.get_mut().rx)
            .poll(cx)
            .map(|received| received.unwrap_or_else(|_| Err(Error::Cancelled)))
    }
}

enum Command {
    AddWorkout(NewWorkout, Reply<workout::Model>),
    DeleteWorkout(workout::Model, Reply<bool>),
    AddMeal(NewMeal, Reply<meal::Model>),
    DeleteMeal(meal::Model, Reply<bool>),
    AddMeditation(NewMeditationSession, Reply<meditation_session::Model>),
    DeleteMeditation(meditation_session::Model, Reply<bool>),
    RegisterUser(NewUser, Reply<RegisterOutcome>),
    LoginUser {
        username: String,
        password: String,
        reply: Reply<LoginOutcome>,
    },
    Logout(Reply<()>),
    SavedLogin(Reply<SavedLogin>),
    Flush(Reply<()>),
}

/// Cloneable handle to the application state.
#[derive(Clone, Debug)]
pub struct FitnessState {
    inner: Arc<Inner>,
}

#[derive(Debug)]
struct Inner {
    commands: mpsc::UnboundedSender<Command>,
    cancel: CancellationToken,
    workouts: watch::Receiver<Vec<workout::Model>>,
    meals: watch::Receiver<Vec<meal::Model>>,
    meditations: watch::Receiver<Vec<meditation_session::Model>>,
}

impl Drop for Inner {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

impl FitnessState {
    /// Starts the worker and the collection mirrors.
    ///
    /// Must be called from within a Tokio runtime.
    #[must_use]
    pub fn new(repository: FitnessRepository) -> Self {
        let cancel = CancellationToken::new();
        let (commands, queue) = mpsc::unbounded_channel();

        let workouts = spawn_mirror(repository.all_workouts(), cancel.clone());
        let meals = spawn_mirror(repository.all_meals(), cancel.clone());
        let meditations = spawn_mirror(repository.all_meditation_sessions(), cancel.clone());
        tokio::spawn(run_worker(repository, queue, cancel.clone()));

        Self {
            inner: Arc::new(Inner {
                commands,
                cancel,
                workouts,
                meals,
                meditations,
            }),
        }
    }

    /// Workouts as last published, newest first. Starts empty.
    #[must_use]
    pub fn workouts(&self) -> watch::Receiver<Vec<workout::Model>> {
        self.inner.workouts.clone()
    }

    /// Meals as last published, newest first. Starts empty.
    #[must_use]
    pub fn meals(&self) -> watch::Receiver<Vec<meal::Model>> {
        self.inner.meals.clone()
    }

    /// Meditation sessions as last published, newest first. Starts empty.
    #[must_use]
    pub fn meditations(&self) -> watch::Receiver<Vec<meditation_session::Model>> {
        self.inner.meditations.clone()
    }

    /// Logs a workout.
    pub fn add_workout(
        &self,
        exercise: impl Into<String>,
        duration: impl Into<String>,
        intensity: impl Into<String>,
    ) -> Pending<workout::Model> {
        let new_workout = NewWorkout::new(exercise, duration, intensity);
        self.enqueue(|reply| Command::AddWorkout(new_workout, reply))
    }

    /// Removes a workout previously read from [`Self::workouts`].
    pub fn delete_workout(&self, record: workout::Model) -> Pending<bool> {
        self.enqueue(|reply| Command::DeleteWorkout(record, reply))
    }

    /// Logs a meal.
    pub fn add_meal(
        &self,
        meal_type: impl Into<String>,
        description: impl Into<String>,
        calories: impl Into<String>,
    ) -> Pending<meal::Model> {
        let new_meal = NewMeal::new(meal_type, description, calories);
        self.enqueue(|reply| Command::AddMeal(new_meal, reply))
    }

    /// Removes a meal previously read from [`Self::meals`].
    pub fn delete_meal(&self, record: meal::Model) -> Pending<bool> {
        self.enqueue(|reply| Command::DeleteMeal(record, reply))
    }

    /// Saves a meditation session.
    pub fn add_meditation(
        &self,
        kind: impl Into<String>,
        duration: impl Into<String>,
        date: impl Into<String>,
    ) -> Pending<meditation_session::Model> {
        let new_session = NewMeditationSession::new(kind, duration, date);
        self.enqueue(|reply| Command::AddMeditation(new_session, reply))
    }

    /// Removes a session previously read from [`Self::meditations`].
    pub fn delete_meditation(&self, record: meditation_session::Model) -> Pending<bool> {
        self.enqueue(|reply| Command::DeleteMeditation(record, reply))
    }

    /// Registers a user unless the username is taken.
    pub fn register_user(&self, new_user: NewUser) -> Pending<RegisterOutcome> {
        self.enqueue(|reply| Command::RegisterUser(new_user, reply))
    }

    /// Checks credentials; on success the login is remembered for the next run.
    pub fn login_user(
        &self,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Pending<LoginOutcome> {
        let username = username.into();
        let password = password.into();
        self.enqueue(|reply| Command::LoginUser {
            username,
            password,
            reply,
        })
    }

    /// Forgets the remembered login.
    pub fn logout(&self) -> Pending<()> {
        self.enqueue(Command::Logout)
    }

    /// Reads the remembered login.
    pub fn saved_login(&self) -> Pending<SavedLogin> {
        self.enqueue(Command::SavedLogin)
    }

    /// Resolves after every job queued before it has finished.
    pub fn flush(&self) -> Pending<()> {
        self.enqueue(Command::Flush)
    }

    /// Stops the worker and the mirrors. Queued jobs resolve to `Error::Cancelled`.
    pub fn close(&self) {
        self.inner.cancel.cancel();
    }

    /// Whether [`Self::close`] was called.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.inner.cancel.is_cancelled()
    }

    fn enqueue<T>(&self, command: impl FnOnce(Reply<T>) -> Command) -> Pending<T> {
        let (reply, rx) = oneshot::channel();
        // On failure the command, and its reply sender, is dropped: the caller
        // observes `Error::Cancelled`.
        if self.inner.commands.send(command(reply)).is_err() {
            debug!("State holder closed, dropping job");
        }
        Pending { rx }
    }
}

/// Republishes an upstream live collection through a channel that starts empty.
fn spawn_mirror<M>(
    mut upstream: LiveQuery<M>,
    cancel: CancellationToken,
) -> watch::Receiver<Vec<M>>
where
    M: Clone + Send + Sync + 'static,
{
    let (tx, rx) = watch::channel(Vec::new());

    tokio::spawn(async move {
        let initial = upstream.borrow_and_update().clone();
        tx.send_replace(initial);

        loop {
            tokio::select! {
                () = cancel.cancelled() => break,
                changed = upstream.changed() => {
                    if changed.is_err() {
                        break;
                    }
                    let snapshot = upstream.borrow_and_update().clone();
                    tx.send_replace(snapshot);
                }
            }
        }
    });

    rx
}

async fn run_worker(
    repository: FitnessRepository,
    mut queue: mpsc::UnboundedReceiver<Command>,
    cancel: CancellationToken,
) {
    debug!("State worker started");
    loop {
        let command = tokio::select! {
            biased;
            () = cancel.cancelled() => break,
            command = queue.recv() => match command {
                Some(command) => command,
                None => break,
            },
        };
        execute(&repository, command).await;
    }
    debug!("State worker stopped");
}

async fn execute(repository: &FitnessRepository, command: Command) {
    match command {
        Command::AddWorkout(new_workout, reply) => {
            respond(reply, "add workout", repository.insert_workout(new_workout).await);
        }
        Command::DeleteWorkout(record, reply) => {
            let result = repository.delete_workout(&record).await.map(|rows| rows > 0);
            respond(reply, "delete workout", result);
        }
        Command::AddMeal(new_meal, reply) => {
            respond(reply, "add meal", repository.insert_meal(new_meal).await);
        }
        Command::DeleteMeal(record, reply) => {
            let result = repository.delete_meal(&record).await.map(|rows| rows > 0);
            respond(reply, "delete meal", result);
        }
        Command::AddMeditation(new_session, reply) => {
            let result = repository.insert_meditation_session(new_session).await;
            respond(reply, "add meditation", result);
        }
        Command::DeleteMeditation(record, reply) => {
            let result = repository
                .delete_meditation_session(&record)
                .await
                .map(|rows| rows > 0);
            respond(reply, "delete meditation", result);
        }
        Command::RegisterUser(new_user, reply) => {
            respond(reply, "register user", register(repository, new_user).await);
        }
        Command::LoginUser {
            username,
            password,
            reply,
        } => {
            let result = login(repository, &username, &password).await;
            respond(reply, "login", result);
        }
        Command::Logout(reply) => {
            respond(reply, "logout", repository.forget_login().await);
        }
        Command::SavedLogin(reply) => {
            respond(reply, "load saved login", repository.saved_login().await);
        }
        Command::Flush(reply) => respond(reply, "flush", Ok(())),
    }
}

async fn register(
    repository: &FitnessRepository,
    new_user: NewUser,
) -> Result<RegisterOutcome> {
    if repository
        .find_user_by_username(&new_user.username)
        .await?
        .is_some()
    {
        return Ok(RegisterOutcome::UsernameTaken);
    }

    // The pre-check is advisory; the unique constraint decides.
    if repository.register_user(new_user).await? {
        Ok(RegisterOutcome::Registered)
    } else {
        Ok(RegisterOutcome::UsernameTaken)
    }
}

async fn login(
    repository: &FitnessRepository,
    username: &str,
    password: &str,
) -> Result<LoginOutcome> {
    let outcome = match repository.find_user_by_username(username).await? {
        None => LoginOutcome::UserNotFound,
        Some(user) if user.password == password => {
            repository.remember_login(&user.username).await?;
            LoginOutcome::Success
        }
        Some(_) => LoginOutcome::WrongPassword,
    };

    if outcome == LoginOutcome::Success {
        info!("User '{}' logged in", username);
    } else {
        warn!("Login failed for '{}': {}", username, outcome.message());
    }
    Ok(outcome)
}

fn respond<T>(reply: Reply<T>, job: &str, result: Result<T>) {
    if let Err(e) = &result {
        error!("Failed to {}: {}", job, e);
    }
    // A dropped `Pending` means nobody is waiting for the outcome.
    let _ = reply.send(result);
}
