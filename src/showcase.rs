//! Hard-coded figures behind the organizer dashboard and profile pages.

use serde::Serialize;
use time::{macros::date, Date};

use crate::{
    catalog::{self, Catalog, EventRecord},
    recommend::UserProfile,
};

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct DailySales {
    pub name: &'static str,
    pub sales: u32,
    pub revenue: u32,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Headline {
    pub total_attendees: u32,
    pub attendees_trend: &'static str,
    pub tickets_sold: u32,
    pub sold_ratio: &'static str,
    pub gross_revenue: u32,
    pub revenue_trend: &'static str,
    pub days_until_main_night: u32,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Dashboard {
    pub active_event: Option<EventRecord>,
    pub headline: Headline,
    pub weekly_sales: Vec<DailySales>,
    pub week_sales_total: u32,
    pub week_revenue_total: u32,
    pub peak_hours: &'static str,
}

const WEEKLY_SALES: [(&str, u32, u32); 7] = [
    ("Mon", 400, 1200),
    ("Tue", 300, 900),
    ("Wed", 200, 600),
    ("Thu", 278, 834),
    ("Fri", 189, 567),
    ("Sat", 239, 717),
    ("Sun", 349, 1047),
];

pub fn dashboard(catalog: &Catalog) -> Dashboard {
    let weekly_sales = WEEKLY_SALES
        .iter()
        .map(|&(name, sales, revenue)| DailySales {
            name,
            sales,
            revenue,
        })
        .collect::<Vec<_>>();
    Dashboard {
        active_event: catalog.events().first().cloned(),
        headline: Headline {
            total_attendees: 1284,
            attendees_trend: "+12.5%",
            tickets_sold: 2450,
            sold_ratio: "95% Sold",
            gross_revenue: 14520,
            revenue_trend: "+8.2%",
            days_until_main_night: 12,
        },
        week_sales_total: weekly_sales.iter().map(|day| day.sales).sum(),
        week_revenue_total: weekly_sales.iter().map(|day| day.revenue).sum(),
        weekly_sales,
        peak_hours: "7:00 PM - 9:00 PM",
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub enum PurchaseStatus {
    Valid,
    Used,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Purchase {
    #[serde(flatten)]
    pub event: EventRecord,
    #[serde(with = "catalog::iso_date")]
    pub purchase_date: Date,
    pub status: PurchaseStatus,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    pub user_id: &'static str,
    pub name: &'static str,
    pub email: &'static str,
    pub programme: &'static str,
    pub badges: [&'static str; 3],
    pub purchases: Vec<Purchase>,
    pub preferences: Vec<&'static str>,
}

impl Profile {
    /// What the recommendation widget knows about this visitor.
    pub fn recommendation_profile(&self) -> UserProfile {
        UserProfile {
            user_id: self.user_id.to_string(),
            past_purchases: Some(
                self.purchases
                    .iter()
                    .map(|purchase| purchase.event.name.clone())
                    .collect(),
            ),
            preferences: Some(
                self.preferences.iter().map(ToString::to_string).collect(),
            ),
        }
    }
}

pub fn profile(catalog: &Catalog) -> Profile {
    let purchases = [
        ("2", date!(2025 - 04 - 10), PurchaseStatus::Valid),
        ("6", date!(2025 - 04 - 12), PurchaseStatus::Used),
    ]
    .into_iter()
    .filter_map(|(id, purchase_date, status)| {
        Some(Purchase {
            event: catalog.get(&id.into())?.clone(),
            purchase_date,
            status,
        })
    })
    .collect();

    Profile {
        user_id: "user_123",
        name: "Saman Perera",
        email: "saman.p@university.edu",
        programme: "Level 3 Computer Science",
        badges: ["Event Lover", "Hackathon Pro", "Early Bird"],
        purchases,
        preferences: vec!["Technology", "Entrepreneurship", "Music"],
    }
}
