//! Teams service: teams the current user belongs to, their memberships and shared preferences.

pub mod models;


use crate::core::{segment, Client, Error};
use models::{
    CreateMembershipRequest, CreateTeamRequest, Invitee, Membership, MembershipList,
    Preferences, RolesRequest, Team, TeamList, TeamNameRequest, TeamPrefsRequest,
};

#[derive(Clone)]
pub struct Teams {
    client: Client,
}

impl Teams {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    fn team_path(team_id: &str) -> String {
        format!("/teams/{}", segment(team_id))
    }

    fn membership_path(team_id: &str, membership_id: &str) -> String {
        format!(
            "{}/memberships/{}",
            Self::team_path(team_id),
            segment(membership_id)
        )
    }

    pub async fn list(&self, queries: &[String], search: Option<&str>) -> Result<TeamList, Error> {
        let mut params: Vec<(&str, &str)> =
            queries.iter().map(|q| ("queries[]", q.as_str())).collect();
        if let Some(search) = search {
            params.push(("search", search));
        }
        self.client
            .send(self.client.get("/teams").query(&params), "List teams")
            .await
    }

    /// Creates a team; the caller becomes its owner with `roles` (defaults to `owner`).
    pub async fn create(
        &self,
        team_id: &str,
        name: &str,
        roles: Option<&[String]>,
    ) -> Result<Team, Error> {
        let request = CreateTeamRequest {
            team_id,
            name,
            roles,
        };
        self.client
            .send(self.client.post("/teams").json(&request), "Create team")
            .await
    }

    pub async fn get(&self, team_id: &str) -> Result<Team, Error> {
        self.client
            .send(self.client.get(&Self::team_path(team_id)), "Get team")
            .await
    }

    pub async fn update_name(&self, team_id: &str, name: &str) -> Result<Team, Error> {
        let request = self
            .client
            .put(&Self::team_path(team_id))
            .json(&TeamNameRequest { name });
        self.client.send(request, "Update team name").await
    }

    pub async fn delete(&self, team_id: &str) -> Result<(), Error> {
        self.client
            .send_empty(self.client.delete(&Self::team_path(team_id)), "Delete team")
            .await
    }

    pub async fn list_memberships(
        &self,
        team_id: &str,
        queries: &[String],
    ) -> Result<MembershipList, Error> {
        let params: Vec<(&str, &str)> = queries.iter().map(|q| ("queries[]", q.as_str())).collect();
        let path = format!("{}/memberships", Self::team_path(team_id));
        self.client
            .send(self.client.get(&path).query(&params), "List memberships")
            .await
    }

    /// Invites someone to the team. Email invitations link back to `url`.
    pub async fn create_membership(
        &self,
        team_id: &str,
        roles: &[String],
        invitee: &Invitee,
        url: Option<&str>,
    ) -> Result<Membership, Error> {
        let path = format!("{}/memberships", Self::team_path(team_id));
        let request = CreateMembershipRequest {
            roles,
            invitee,
            url,
        };
        self.client
            .send(self.client.post(&path).json(&request), "Create membership")
            .await
    }

    pub async fn get_membership(
        &self,
        team_id: &str,
        membership_id: &str,
    ) -> Result<Membership, Error> {
        self.client
            .send(
                self.client.get(&Self::membership_path(team_id, membership_id)),
                "Get membership",
            )
            .await
    }

    /// Replaces the member's roles.
    pub async fn update_membership(
        &self,
        team_id: &str,
        membership_id: &str,
        roles: &[String],
    ) -> Result<Membership, Error> {
        let request = self
            .client
            .patch(&Self::membership_path(team_id, membership_id))
            .json(&RolesRequest { roles });
        self.client.send(request, "Update membership").await
    }

    pub async fn delete_membership(&self, team_id: &str, membership_id: &str) -> Result<(), Error> {
        self.client
            .send_empty(
                self.client.delete(&Self::membership_path(team_id, membership_id)),
                "Delete membership",
            )
            .await
    }

    pub async fn get_prefs(&self, team_id: &str) -> Result<Preferences, Error> {
        let path = format!("{}/prefs", Self::team_path(team_id));
        self.client.send(self.client.get(&path), "Get team preferences").await
    }

    /// Replaces the team's shared preferences.
    pub async fn update_prefs(
        &self,
        team_id: &str,
        prefs: &Preferences,
    ) -> Result<Preferences, Error> {
        let path = format!("{}/prefs", Self::team_path(team_id));
        let request = self.client.put(&path).json(&TeamPrefsRequest { prefs });
        self.client.send(request, "Update team preferences").await
    }
}
