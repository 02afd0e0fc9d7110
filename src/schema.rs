diesel::table! {
    order_items (id) {
        id -> Int4,
        order_id -> Int4,
        product_id -> Int4,
        quantity -> Int4,
        price -> Numeric,
        total -> Numeric,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    orders (id) {
        id -> Int4,
        user_id -> Int4,
        #[max_length = 50]
        order_number -> Varchar,
        #[max_length = 50]
        status -> Varchar,
        total_amount -> Numeric,
        shipping_amount -> Numeric,
        discount_amount -> Numeric,
        tax_amount -> Numeric,
        #[max_length = 10]
        currency -> Varchar,
        shipping_address -> Jsonb,
        billing_address -> Nullable<Jsonb>,
        #[max_length = 50]
        payment_method -> Varchar,
        #[max_length = 50]
        payment_status -> Varchar,
        #[max_length = 100]
        shipping_method -> Nullable<Varchar>,
        notes -> Nullable<Text>,
        #[max_length = 255]
        payment_id -> Nullable<Varchar>,
        payment_confirmation_url -> Nullable<Text>,
        payment_paid_at -> Nullable<Timestamptz>,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    products (id) {
        id -> Int4,
        #[max_length = 255]
        name -> Varchar,
        #[max_length = 100]
        sku -> Nullable<Varchar>,
        price -> Numeric,
        images -> Jsonb,
        is_active -> Bool,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::joinable!(order_items -> orders (order_id));
diesel::joinable!(order_items -> products (product_id));

diesel::allow_tables_to_appear_in_same_query!(order_items, orders, products,);
