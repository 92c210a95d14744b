//! Membership business logic
//!
//! A membership grants a role to a user or group within an organization or
//! domain. Both the role and the member must already exist under the same
//! reference before the grant is recorded.

use crate::error::{AppError, Result};
use crate::model::{
    CreateMembershipInput, MemberType, Membership, Reference, UpdateMembershipInput, UuidStr,
};
use crate::repository::{GroupRepository, MembershipRepository, RoleRepository, UserRepository};
use std::sync::Arc;
use validator::Validate;

pub struct MembershipService<R, RR, UR, GR>
where
    R: MembershipRepository,
    RR: RoleRepository,
    UR: UserRepository,
    GR: GroupRepository,
{
    repo: Arc<R>,
    role_repo: Arc<RR>,
    user_repo: Arc<UR>,
    group_repo: Arc<GR>,
}

impl<R, RR, UR, GR> MembershipService<R, RR, UR, GR>
where
    R: MembershipRepository,
    RR: RoleRepository,
    UR: UserRepository,
    GR: GroupRepository,
{
    pub fn new(
        repo: Arc<R>,
        role_repo: Arc<RR>,
        user_repo: Arc<UR>,
        group_repo: Arc<GR>,
    ) -> Self {
        Self {
            repo,
            role_repo,
            user_repo,
            group_repo,
        }
    }

    async fn check_role(&self, reference: &Reference, role_id: &UuidStr) -> Result<()> {
        let role = self
            .role_repo
            .find_by_id(role_id)
            .await?
            .ok_or_else(|| AppError::BadRequest(format!("Role {} not found", role_id)))?;

        if role.reference() != *reference {
            return Err(AppError::BadRequest(format!(
                "Role {} does not belong to this {}",
                role_id,
                reference.reference_type.to_string().to_lowercase()
            )));
        }

        Ok(())
    }

    async fn check_member(
        &self,
        reference: &Reference,
        member_type: MemberType,
        member_id: &UuidStr,
    ) -> Result<()> {
        let member_reference = match member_type {
            MemberType::User => self
                .user_repo
                .find_by_id(member_id)
                .await?
                .map(|u| u.reference()),
            MemberType::Group => self
                .group_repo
                .find_by_id(member_id)
                .await?
                .map(|g| g.reference()),
        };

        match member_reference {
            None => Err(AppError::BadRequest(format!(
                "{} {} not found",
                member_type, member_id
            ))),
            Some(r) if r != *reference => Err(AppError::BadRequest(format!(
                "{} {} does not belong to this {}",
                member_type,
                member_id,
                reference.reference_type.to_string().to_lowercase()
            ))),
            Some(_) => Ok(()),
        }
    }

    pub async fn create(
        &self,
        reference: &Reference,
        input: CreateMembershipInput,
    ) -> Result<Membership> {
        input.validate()?;

        self.check_role(reference, &input.role_id).await?;
        self.check_member(reference, input.member_type, &input.member_id)
            .await?;

        if self
            .repo
            .find_by_member_and_role(reference, input.member_type, &input.member_id, &input.role_id)
            .await?
            .is_some()
        {
            return Err(AppError::Conflict(
                "Member already holds this role".to_string(),
            ));
        }

        self.repo.create(reference, &input).await
    }

    pub async fn get(&self, reference: &Reference, id: &UuidStr) -> Result<Membership> {
        let membership = self
            .repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Membership {} not found", id)))?;

        if membership.reference() != *reference {
            return Err(AppError::BadRequest(format!(
                "Membership {} does not belong to this {}",
                id,
                reference.reference_type.to_string().to_lowercase()
            )));
        }

        Ok(membership)
    }

    pub async fn list(
        &self,
        reference: &Reference,
        page: i64,
        per_page: i64,
    ) -> Result<(Vec<Membership>, i64)> {
        let offset = (page - 1) * per_page;
        let memberships = self
            .repo
            .list_by_reference(reference, offset, per_page)
            .await?;
        let total = self.repo.count_by_reference(reference).await?;
        Ok((memberships, total))
    }

    pub async fn update(
        &self,
        reference: &Reference,
        id: &UuidStr,
        input: UpdateMembershipInput,
    ) -> Result<Membership> {
        input.validate()?;

        let existing = self.get(reference, id).await?;
        self.check_role(reference, &input.role_id).await?;

        if self
            .repo
            .find_by_member_and_role(
                reference,
                existing.member_type,
                &existing.member_id,
                &input.role_id,
            )
            .await?
            .is_some()
        {
            return Err(AppError::Conflict(
                "Member already holds this role".to_string(),
            ));
        }

        self.repo.update(id, &input).await
    }

    pub async fn delete(&self, reference: &Reference, id: &UuidStr) -> Result<()> {
        let _ = self.get(reference, id).await?;
        self.repo.delete(id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Role, User};
    use crate::repository::group::MockGroupRepository;
    use crate::repository::membership::MockMembershipRepository;
    use crate::repository::role::MockRoleRepository;
    use crate::repository::user::MockUserRepository;

    fn reference() -> Reference {
        Reference::domain(UuidStr::new_v4())
    }

    #[tokio::test]
    async fn test_create_grants_role_to_user() {
        let reference = reference();
        let role = Role {
            reference_type: reference.reference_type,
            reference_id: reference.reference_id,
            ..Default::default()
        };
        let user = User {
            reference_type: reference.reference_type,
            reference_id: reference.reference_id,
            ..Default::default()
        };
        let input = CreateMembershipInput {
            member_type: MemberType::User,
            member_id: user.id,
            role_id: role.id,
        };

        let mut role_repo = MockRoleRepository::new();
        role_repo
            .expect_find_by_id()
            .returning(move |_| Ok(Some(role.clone())));
        let mut user_repo = MockUserRepository::new();
        user_repo
            .expect_find_by_id()
            .returning(move |_| Ok(Some(user.clone())));
        let mut repo = MockMembershipRepository::new();
        repo.expect_find_by_member_and_role()
            .returning(|_, _, _, _| Ok(None));
        repo.expect_create()
            .returning(|r, input| {
                Ok(Membership {
                    reference_type: r.reference_type,
                    reference_id: r.reference_id,
                    member_type: input.member_type,
                    member_id: input.member_id,
                    role_id: input.role_id,
                    ..Default::default()
                })
            });

        let svc = MembershipService::new(
            Arc::new(repo),
            Arc::new(role_repo),
            Arc::new(user_repo),
            Arc::new(MockGroupRepository::new()),
        );

        let membership = svc.create(&reference, input).await.unwrap();
        assert_eq!(membership.member_type, MemberType::User);
    }

    #[tokio::test]
    async fn test_create_rejects_role_from_other_reference() {
        let mut role_repo = MockRoleRepository::new();
        role_repo
            .expect_find_by_id()
            .returning(|_| Ok(Some(Role::default())));

        let svc = MembershipService::new(
            Arc::new(MockMembershipRepository::new()),
            Arc::new(role_repo),
            Arc::new(MockUserRepository::new()),
            Arc::new(MockGroupRepository::new()),
        );

        let input = CreateMembershipInput {
            member_type: MemberType::User,
            member_id: UuidStr::new_v4(),
            role_id: UuidStr::new_v4(),
        };
        let err = svc.create(&reference(), input).await.unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));
    }

    #[tokio::test]
    async fn test_create_rejects_duplicate_grant() {
        let reference = reference();
        let role = Role {
            reference_type: reference.reference_type,
            reference_id: reference.reference_id,
            ..Default::default()
        };
        let user = User {
            reference_type: reference.reference_type,
            reference_id: reference.reference_id,
            ..Default::default()
        };
        let input = CreateMembershipInput {
            member_type: MemberType::User,
            member_id: user.id,
            role_id: role.id,
        };

        let mut role_repo = MockRoleRepository::new();
        role_repo
            .expect_find_by_id()
            .returning(move |_| Ok(Some(role.clone())));
        let mut user_repo = MockUserRepository::new();
        user_repo
            .expect_find_by_id()
            .returning(move |_| Ok(Some(user.clone())));
        let mut repo = MockMembershipRepository::new();
        repo.expect_find_by_member_and_role()
            .returning(|_, _, _, _| Ok(Some(Membership::default())));

        let svc = MembershipService::new(
            Arc::new(repo),
            Arc::new(role_repo),
            Arc::new(user_repo),
            Arc::new(MockGroupRepository::new()),
        );

        let err = svc.create(&reference, input).await.unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));
    }
}
