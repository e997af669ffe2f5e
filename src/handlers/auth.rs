use axum::{
    Form,
    extract::State,
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::cookie::CookieJar;
use model::entities::user;
use sea_orm::{ActiveModelTrait, ColumnTrait, DbErr, EntityTrait, QueryFilter, Set, SqlErr};
use tracing::{debug, error, info, instrument, trace, warn};

use crate::handlers::validate_form;
use crate::password;
use crate::schemas::{AppState, LoginForm, RegisterForm};
use crate::views::{Apology, LoginTemplate, RegisterTemplate, render};

async fn find_by_username(
    state: &AppState,
    username: &str,
) -> Result<Option<user::Model>, DbErr> {
    user::Entity::find()
        .filter(user::Column::Username.eq(username))
        .one(&state.db)
        .await
}

/// Show the login form. Visiting it logs the current user out.
#[instrument(skip_all)]
pub async fn login_form(
    State(state): State<AppState>,
    jar: CookieJar,
) -> Result<Response, Apology> {
    let flashes = state.sessions.take_flashes(&jar).await;
    let jar = state.sessions.clear(jar).await;

    let page = render(&LoginTemplate {
        flashes,
        logged_in: false,
    })?;
    Ok((jar, page).into_response())
}

/// Checks the submitted credentials against the stored hash.
async fn authenticate(state: &AppState, form: LoginForm) -> Result<user::Model, Apology> {
    validate_form(&form, LoginForm::FIELDS)?;

    let Some(account) = find_by_username(state, &form.username).await? else {
        debug!("Login attempt for unknown user");
        return Err(Apology::bad_request("invalid username and/or password"));
    };

    let stored = account.hash.clone();
    let verified = tokio::task::spawn_blocking(move || password::verify(&stored, &form.password))
        .await
        .map_err(|e| {
            error!("Password verification task failed: {}", e);
            Apology::internal()
        })?;
    if !verified {
        warn!("Wrong password for user {}", account.id);
        return Err(Apology::bad_request("invalid username and/or password"));
    }

    Ok(account)
}

/// Log a user in. The previous session ends whether or not this succeeds.
#[instrument(skip_all, fields(username = %form.username))]
pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    Form(form): Form<LoginForm>,
) -> Response {
    trace!("Entering login function");
    let jar = state.sessions.clear(jar).await;

    match authenticate(&state, form).await {
        Ok(account) => {
            let jar = state.sessions.login(jar, account.id).await;
            info!("User {} logged in", account.username);
            (jar, Redirect::to("/")).into_response()
        }
        Err(apology) => (jar, apology).into_response(),
    }
}

/// Log the current user out
#[instrument(skip_all)]
pub async fn logout(State(state): State<AppState>, jar: CookieJar) -> impl IntoResponse {
    let jar = state.sessions.clear(jar).await;
    (jar, Redirect::to("/"))
}

/// Show the registration form
pub async fn register_form(
    State(state): State<AppState>,
    jar: CookieJar,
) -> Result<Response, Apology> {
    let flashes = state.sessions.take_flashes(&jar).await;
    let logged_in = state.sessions.user_id(&jar).await.is_some();
    Ok(render(&RegisterTemplate { flashes, logged_in })?.into_response())
}

/// Register a new user with the default starting cash
#[instrument(skip_all, fields(username = %form.username))]
pub async fn register(
    State(state): State<AppState>,
    jar: CookieJar,
    Form(form): Form<RegisterForm>,
) -> Result<Response, Apology> {
    trace!("Entering register function");
    validate_form(&form, RegisterForm::FIELDS)?;

    if find_by_username(&state, &form.username).await?.is_some() {
        debug!("Username already taken");
        return Err(Apology::bad_request("username already exist"));
    }

    if form.password != form.confirmation {
        return Err(Apology::bad_request("don't match password"));
    }

    let hasher = state.passwords;
    let password = form.password;
    let hash = tokio::task::spawn_blocking(move || hasher.hash(&password))
        .await
        .map_err(|e| {
            error!("Password hashing task failed: {}", e);
            Apology::internal()
        })?;

    let new_user = user::ActiveModel {
        username: Set(form.username.clone()),
        hash: Set(hash),
        cash: Set(user::DEFAULT_CASH),
        ..Default::default()
    };

    match new_user.insert(&state.db).await {
        Ok(created) => {
            info!("User created successfully with ID: {}", created.id);
        }
        Err(db_error) => {
            // Lost a race with a concurrent registration of the same name
            if let Some(SqlErr::UniqueConstraintViolation(_)) = db_error.sql_err() {
                return Err(Apology::bad_request("username already exist"));
            }
            return Err(db_error.into());
        }
    }

    let jar = state.sessions.flash(jar, "Registered!").await;
    Ok((jar, Redirect::to("/login")).into_response())
}
