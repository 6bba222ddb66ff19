//! Permission strings granted by the identity provider's casting roles.

common_auth::permissions! {
    GetMovies => "get:movies",
    PostMovies => "post:movies",
    PatchMovies => "patch:movies",
    DeleteMovies => "delete:movies",
    GetActors => "get:actors",
    PostActors => "post:actors",
    PatchActors => "patch:actors",
    DeleteActors => "delete:actors",
}
