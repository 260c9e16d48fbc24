//! Customer Use Cases

use std::sync::Arc;

use kernel::id::UserId;
use listing::{ListParams, PageResult};

use crate::application::lists::CUSTOMERS;
use crate::domain::entity::customer::{Customer, CustomerProfile};
use crate::domain::repository::{CustomerRepository, OrderRepository};
use crate::domain::value_object::{CustomerId, customer_status::CustomerStatus};
use crate::error::{CommerceError, CommerceResult};

#[derive(Debug, Clone)]
pub struct ProfileInput {
    pub full_name: String,
    pub email: String,
    pub phone: Option<String>,
    pub address: Option<String>,
}

pub struct CustomerService<R>
where
    R: CustomerRepository + OrderRepository,
{
    repo: Arc<R>,
}

impl<R> CustomerService<R>
where
    R: CustomerRepository + OrderRepository,
{
    pub fn new(repo: Arc<R>) -> Self {
        Self { repo }
    }

    pub async fn list(&self, params: &ListParams) -> CommerceResult<PageResult<Customer>> {
        let query = CUSTOMERS.build(params)?;
        CustomerRepository::list(&*self.repo, &query).await
    }

    pub async fn get(&self, customer_id: &CustomerId) -> CommerceResult<Customer> {
        CustomerRepository::find_by_id(&*self.repo, customer_id)
            .await?
            .ok_or(CommerceError::CustomerNotFound)
    }

    /// Profile of the signed-in user
    pub async fn get_own(&self, user_id: UserId) -> CommerceResult<Customer> {
        self.get(&user_id.cast()).await
    }

    /// Create or replace the caller's profile; `true` when newly created
    pub async fn save_own(
        &self,
        user_id: UserId,
        input: ProfileInput,
    ) -> CommerceResult<(Customer, bool)> {
        let profile = CustomerProfile::new(
            &input.full_name,
            &input.email,
            input.phone.as_deref(),
            input.address.as_deref(),
        )?;

        let customer_id: CustomerId = user_id.cast();
        let (customer, created) = match CustomerRepository::find_by_id(&*self.repo, &customer_id).await? {
            Some(mut existing) => {
                existing.apply(profile);
                (existing, false)
            }
            None => (Customer::new(customer_id, profile), true),
        };
        self.repo.upsert(&customer).await?;

        tracing::info!(customer_id = %customer.customer_id, created, "Customer profile saved");

        Ok((customer, created))
    }

    pub async fn set_status(
        &self,
        customer_id: &CustomerId,
        status: CustomerStatus,
    ) -> CommerceResult<Customer> {
        let mut customer = self.get(customer_id).await?;
        customer.set_status(status);
        self.repo.upsert(&customer).await?;

        tracing::info!(customer_id = %customer_id, status = %status, "Customer status changed");

        Ok(customer)
    }

    /// Refused while the customer has pending or processing orders
    pub async fn delete(&self, customer_id: &CustomerId) -> CommerceResult<()> {
        if self.repo.has_open_orders(customer_id).await? {
            return Err(CommerceError::CustomerHasOpenOrders);
        }
        if !CustomerRepository::delete(&*self.repo, customer_id).await? {
            return Err(CommerceError::CustomerNotFound);
        }

        tracing::info!(customer_id = %customer_id, "Customer deleted");

        Ok(())
    }
}
